// src/commands/db.rs
//! Database setup and installed-trove commands

use anyhow::{Context, Result};
use conary_deps::db::{self, models::Trove, SqliteIndex};
use conary_deps::flavor::flavor_to_string;
use conary_deps::manifest::TroveManifest;
use conary_deps::resolver::DependencyIndex;
use std::path::Path;
use tracing::info;

/// Create the database and schema
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing database at: {}", db_path);
    db::init(db_path)?;
    println!("Database initialized successfully at: {}", db_path);
    Ok(())
}

/// Record every trove of a manifest as installed
pub fn cmd_import(manifest_path: &str, db_path: &str) -> Result<()> {
    let manifest = TroveManifest::load(Path::new(manifest_path))
        .with_context(|| format!("Failed to read trove manifest {}", manifest_path))?;
    let mut conn = db::open(db_path)?;

    let count = db::transaction(&mut conn, |tx| {
        for entry in &manifest.trove {
            let spec = entry.spec()?;
            let deps = entry.deps()?;
            db::record_trove(tx, &spec, &deps)?;
            info!("Imported {}", spec);
        }
        Ok(manifest.trove.len())
    })?;

    println!("Imported {} trove(s) into {}", count, db_path);
    Ok(())
}

/// List installed troves, optionally with their dependencies
pub fn cmd_list(pattern: Option<&str>, verbose: bool, db_path: &str) -> Result<()> {
    let conn = db::open(db_path)?;

    let troves = match pattern {
        Some(name) => Trove::find_by_name(&conn, name)?,
        None => Trove::list_all(&conn)?,
    };

    if troves.is_empty() {
        println!("No troves found.");
        return Ok(());
    }

    let index = SqliteIndex::new(&conn);
    println!("Installed troves:");
    for trove in &troves {
        let spec = trove.spec()?;
        let flavor = flavor_to_string(&spec.flavor);
        if flavor.is_empty() {
            println!("  {} {}", spec.name, spec.version);
        } else {
            println!("  {} {} [{}]", spec.name, spec.version, flavor);
        }

        if verbose && let Some(deps) = index.trove_deps(&spec)? {
            for (tag, dep) in deps.requires.iter() {
                println!("    requires {}: {}", tag, dep);
            }
            for (tag, dep) in deps.provides.iter() {
                println!("    provides {}: {}", tag, dep);
            }
        }
    }
    println!("\nTotal: {} trove(s)", troves.len());

    Ok(())
}
