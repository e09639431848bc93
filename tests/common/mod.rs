// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use conary_deps::db;
use conary_deps::dependencies::{parse_dep_set, DependencySet};
use conary_deps::flavor::parse_flavor;
use conary_deps::resolver::{TroveDeps, TroveSpec};
use rusqlite::Connection;
use tempfile::TempDir;

/// Parse human-readable dependency strings into a set.
pub fn deps(list: &[&str]) -> DependencySet {
    parse_dep_set(list.iter().copied()).unwrap()
}

/// A trove spec with the given flavor text.
pub fn spec(name: &str, version: &str, flavor: &str) -> TroveSpec {
    TroveSpec::new(name, version, parse_flavor(flavor, None).unwrap())
}

/// An installed trove: (spec, requires, provides).
pub type Installed = (TroveSpec, &'static [&'static str], &'static [&'static str]);

pub fn installed(
    spec: TroveSpec,
    requires: &'static [&'static str],
    provides: &'static [&'static str],
) -> Installed {
    (spec, requires, provides)
}

/// Create an empty database on disk.
///
/// Returns (TempDir, db_path) - keep the TempDir alive to prevent cleanup.
pub fn setup_empty_db() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_str()
        .unwrap()
        .to_string();

    db::init(&db_path).unwrap();
    (temp_dir, db_path)
}

/// Create a database holding the given installed troves.
pub fn setup_db_with(troves: &[Installed]) -> (TempDir, String, Connection) {
    let (temp_dir, db_path) = setup_empty_db();
    let mut conn = db::open(&db_path).unwrap();

    db::transaction(&mut conn, |tx| {
        for (spec, requires, provides) in troves {
            let trove_deps = TroveDeps {
                requires: deps(requires),
                provides: deps(provides),
            };
            db::record_trove(tx, spec, &trove_deps)?;
        }
        Ok(())
    })
    .unwrap();

    (temp_dir, db_path, conn)
}
