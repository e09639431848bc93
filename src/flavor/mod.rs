// src/flavor/mod.rs
//! Flavor string parsing and matching
//!
//! Flavors represent build-time variations like architecture and features.
//! A flavor is a `DependencySet` with two axes: use flags and instruction
//! sets. Syntax follows original Conary: `ssl,!debug,~vmware is: x86(i686,~sse2) x86_64`
//!
//! An optional `use:` prefix, enclosing brackets and a comma before `is:`
//! are accepted, so `[ssl, !debug, is: x86_64]` parses too.

use crate::dependencies::{ClassTag, Dependency, DependencySet, MergeType, Sense};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Name of the single dependency held by the use class
pub const USE_DEP_NAME: &str = "use";

/// Find the `is:` marker that starts the instruction set section
fn find_is_marker(s: &str) -> Option<usize> {
    s.match_indices("is:").map(|(i, _)| i).find(|&i| {
        i == 0
            || s[..i]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_whitespace() || c == ',' || c == '[')
    })
}

/// Split the instruction set section on whitespace outside parentheses
fn split_arches(s: &str) -> Result<Vec<&str>> {
    let mut arches = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Error::ParseError(format!("Unbalanced ')' in instruction set '{}'", s))
                })?;
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    arches.push(&s[begin..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }

    if depth != 0 {
        return Err(Error::ParseError(format!(
            "Unbalanced '(' in instruction set '{}'",
            s
        )));
    }
    if let Some(begin) = start {
        arches.push(&s[begin..]);
    }
    Ok(arches)
}

/// Parse a comma separated flag list like `i686,~sse2,!3dnow`
fn parse_flag_list(s: &str) -> Result<Vec<(String, Sense)>> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            Sense::parse_with_name(item).map(|(sense, name)| (name.to_string(), sense))
        })
        .collect()
}

/// Parse one architecture like `x86(i686,~sse2)`
fn parse_arch(token: &str) -> Result<Dependency> {
    let (name, flags) = match token.find('(') {
        Some(open) => {
            let inner = token[open + 1..].strip_suffix(')').ok_or_else(|| {
                Error::ParseError(format!("Unterminated flag list in architecture '{}'", token))
            })?;
            (&token[..open], parse_flag_list(inner)?)
        }
        None => (token, Vec::new()),
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::ParseError(format!(
            "Missing architecture name in '{}'",
            token
        )));
    }
    Dependency::with_flags(name, flags)
}

/// Parse a flavor string
///
/// When `base` is given, an axis the string does not mention at all is
/// inherited from it. An axis that is mentioned with nothing after it
/// (`use:` or `is:` alone) stays present but empty.
///
/// Examples:
/// - `ssl,!debug is: x86_64`
/// - `use: ~vmware`
/// - `is: x86(i686,sse2) x86_64`
/// - `[ssl, !debug, is: x86_64]`
pub fn parse_flavor(s: &str, base: Option<&DependencySet>) -> Result<DependencySet> {
    let s = s.trim();
    let s = match s.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']').ok_or_else(|| {
            Error::ParseError(format!("Unterminated '[' in flavor '{}'", s))
        })?,
        None => s,
    };

    let (use_part, is_part) = match find_is_marker(s) {
        Some(i) => (&s[..i], Some(s[i + 3..].trim())),
        None => (s, None),
    };

    let use_part = use_part.trim().trim_end_matches(',').trim();
    let (explicit_use, use_part) = match use_part.strip_prefix("use:") {
        Some(rest) => (true, rest.trim()),
        None => (false, use_part),
    };

    let mut flavor = DependencySet::new();

    if explicit_use || !use_part.is_empty() {
        flavor.add_empty_class(ClassTag::Use);
        for (flag, sense) in parse_flag_list(use_part)? {
            flavor.add_dep(ClassTag::Use, Dependency::with_flags(USE_DEP_NAME, [(flag, sense)])?)?;
        }
    }

    if let Some(is_part) = is_part {
        flavor.add_empty_class(ClassTag::InstructionSet);
        for token in split_arches(is_part)? {
            flavor.add_dep(ClassTag::InstructionSet, parse_arch(token)?)?;
        }
    }

    if let Some(base) = base {
        flavor = merge_flavor(&flavor, base);
    }

    Ok(flavor)
}

fn format_flags(dep: &Dependency) -> String {
    dep.flags()
        .iter()
        .map(|(flag, sense)| format!("{}{}", sense.prefix(), flag))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a flavor in the user-facing grammar
///
/// Classes other than the two flavor axes are not shown.
pub fn flavor_to_string(flavor: &DependencySet) -> String {
    let mut parts = Vec::new();

    if let Some(class) = flavor.class(ClassTag::Use) {
        match class.get(USE_DEP_NAME) {
            Some(dep) if dep.has_flags() => parts.push(format_flags(dep)),
            _ => parts.push("use:".to_string()),
        }
    }

    if let Some(class) = flavor.class(ClassTag::InstructionSet) {
        let arches: Vec<String> = class
            .iter()
            .map(|dep| {
                if dep.has_flags() {
                    format!("{}({})", dep.name(), format_flags(dep))
                } else {
                    dep.name().to_string()
                }
            })
            .collect();
        if arches.is_empty() {
            parts.push("is:".to_string());
        } else {
            parts.push(format!("is: {}", arches.join(" ")));
        }
    }

    parts.join(" ")
}

/// Fill the flavor axes `flavor` does not mention from `base`
pub fn merge_flavor(flavor: &DependencySet, base: &DependencySet) -> DependencySet {
    let mut merged = flavor.clone();
    for tag in [ClassTag::Use, ClassTag::InstructionSet] {
        if merged.has_class(tag) {
            continue;
        }
        if let Some(class) = base.class(tag) {
            merged.insert_class(class.clone());
        }
    }
    merged
}

/// Apply a user-specified flavor on top of an existing one
///
/// An instruction set in `new` replaces the old one wholesale; every other
/// class merges with the incoming senses winning.
pub fn override_flavor(old: &DependencySet, new: &DependencySet) -> Result<DependencySet> {
    let mut result = old.clone();
    for class in new.classes() {
        if class.tag() == ClassTag::InstructionSet {
            result.insert_class(class.clone());
            continue;
        }
        let mut single = DependencySet::new();
        single.insert_class(class.clone());
        result.union(&single, MergeType::Override)?;
    }
    Ok(result)
}

/// Use flags of a flavor, sorted by name
pub fn use_flags(flavor: &DependencySet) -> Vec<(String, Sense)> {
    flavor
        .class(ClassTag::Use)
        .and_then(|class| class.get(USE_DEP_NAME))
        .map(|dep| {
            dep.flags()
                .iter()
                .map(|(flag, sense)| (flag.clone(), *sense))
                .collect()
        })
        .unwrap_or_default()
}

/// Architecture names of a flavor
pub fn architectures(flavor: &DependencySet) -> Vec<String> {
    flavor
        .class(ClassTag::InstructionSet)
        .map(|class| class.iter().map(|dep| dep.name().to_string()).collect())
        .unwrap_or_default()
}

/// Instruction set flavor of the running system
pub fn detect_arch_flavor() -> DependencySet {
    DependencySet::single_shared(
        ClassTag::InstructionSet,
        Arc::new(Dependency::new(std::env::consts::ARCH)),
    )
}

/// Select the candidate whose flavor the system flavor satisfies best
pub fn select_best<'a, T>(
    candidates: &'a [(DependencySet, T)],
    system: &DependencySet,
) -> Option<&'a T> {
    candidates
        .iter()
        .filter_map(|(flavor, item)| system.score(flavor).map(|score| (score, item)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, item)| item)
}
