// src/commands/check.rs
//! Changeset closure check

use anyhow::{Context, Result};
use conary_deps::db::{self, SqliteIndex};
use conary_deps::manifest::{ChangesetManifest, TroveManifest};
use conary_deps::resolver::{check_changeset, DependencyIndex, LayeredIndex, MemoryIndex};
use std::path::Path;
use tracing::info;

/// Check a changeset against the installed troves
///
/// Fails when the changeset leaves any requirement unmet.
pub fn cmd_check(
    changeset_path: &str,
    db_path: &str,
    order: bool,
    json: bool,
    assume: Option<&str>,
) -> Result<()> {
    let changeset = ChangesetManifest::load(Path::new(changeset_path))
        .with_context(|| format!("Failed to read changeset {}", changeset_path))?
        .to_changeset()?;
    info!(
        "Checking {} install(s) and {} erase(s)",
        changeset.installs.len(),
        changeset.erases.len()
    );

    let conn = db::open(db_path)?;
    let installed = SqliteIndex::new(&conn);

    let mut assumed = MemoryIndex::new();
    let mut index = LayeredIndex::new(vec![&installed as &dyn DependencyIndex]);
    if let Some(path) = assume {
        let manifest = TroveManifest::load(Path::new(path))
            .with_context(|| format!("Failed to read trove manifest {}", path))?;
        for entry in &manifest.trove {
            let deps = entry.deps()?;
            assumed.add(entry.spec()?, deps.requires, deps.provides)?;
        }
        info!("Assuming {} extra installed trove(s)", assumed.len());
        index.push(&assumed);
    }

    let result = check_changeset(&index, &changeset, order)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", result);
    }

    if !result.is_closed() {
        anyhow::bail!(
            "Changeset leaves {} trove(s) with unresolved dependencies and breaks {} requirement(s)",
            result.failed.len(),
            result.unresolvable.len()
        );
    }
    Ok(())
}
