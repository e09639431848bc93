// src/commands/flavor.rs
//! Flavor inspection commands

use anyhow::Result;
use conary_deps::flavor::{detect_arch_flavor, flavor_to_string, parse_flavor};

/// Parse a flavor and show how it is displayed and stored
pub fn cmd_flavor(text: &str, base: Option<&str>) -> Result<()> {
    let base = match base {
        Some("system") => Some(detect_arch_flavor()),
        Some(base) => Some(parse_flavor(base, None)?),
        None => None,
    };
    let flavor = parse_flavor(text, base.as_ref())?;

    println!("Flavor: {}", flavor_to_string(&flavor));
    println!("Frozen: {}", flavor.freeze());
    for (tag, dep) in flavor.iter() {
        println!("  {}: {}", tag, dep);
    }
    Ok(())
}

/// Print how well a system flavor satisfies a trove flavor
pub fn cmd_score(system: &str, trove: &str) -> Result<()> {
    let system = parse_flavor(system, None)?;
    let trove = parse_flavor(trove, None)?;

    match system.score(&trove) {
        Some(score) => println!("{}", score),
        None => println!("conflict"),
    }
    Ok(())
}
