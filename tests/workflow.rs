// tests/workflow.rs

//! Import, check and remove workflow tests.

mod common;

use common::setup_empty_db;
use conary_deps::db::{self, models::Trove, SqliteIndex};
use conary_deps::manifest::{ChangesetManifest, TroveManifest};
use conary_deps::resolver::{check_changeset, DependencyIndex, LayeredIndex, MemoryIndex};

const INSTALLED: &str = r#"
[[trove]]
name = "glibc:lib"
version = "2.39"
flavor = "is: x86_64"
provides = ["trove: glibc:lib", "soname: ELF64/libc.so.6(GLIBC_2.34 SysV x86_64)"]

[[trove]]
name = "openssl:lib"
version = "3.0.1"
flavor = "is: x86_64"
requires = ["soname: ELF64/libc.so.6(GLIBC_2.34 SysV x86_64)"]
provides = ["trove: openssl:lib", "soname: ELF64/libssl.so.3(SysV x86_64)"]

[[trove]]
name = "curl:lib"
version = "8.5.0"
flavor = "ssl is: x86_64"
requires = ["soname: ELF64/libssl.so.3(SysV x86_64)"]
provides = ["trove: curl:lib", "soname: ELF64/libcurl.so.4(SysV x86_64)"]
"#;

fn import(db_path: &str, manifest: &str) {
    let manifest = TroveManifest::parse(manifest).unwrap();
    let mut conn = db::open(db_path).unwrap();
    db::transaction(&mut conn, |tx| {
        for entry in &manifest.trove {
            db::record_trove(tx, &entry.spec()?, &entry.deps()?)?;
        }
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_import_then_check_install() {
    let (_temp_dir, db_path) = setup_empty_db();
    import(&db_path, INSTALLED);

    let conn = db::open(&db_path).unwrap();
    assert_eq!(Trove::list_all(&conn).unwrap().len(), 3);

    let changeset = ChangesetManifest::parse(
        r#"
        [[install]]
        name = "git"
        version = "2.44"
        flavor = "is: x86_64"
        requires = ["soname: ELF64/libcurl.so.4(SysV x86_64)", "trove: perl:runtime"]

        [[install]]
        name = "perl:runtime"
        version = "5.38"
        flavor = "is: x86_64"
        requires = ["soname: ELF64/libc.so.6(GLIBC_2.34 SysV x86_64)"]
        provides = ["trove: perl:runtime"]
        "#,
    )
    .unwrap()
    .to_changeset()
    .unwrap();

    let index = SqliteIndex::new(&conn);
    let result = check_changeset(&index, &changeset, true).unwrap();
    assert!(result.is_closed(), "{result}");

    let ordering = result.ordering.unwrap();
    let names: Vec<Vec<&str>> = ordering
        .iter()
        .map(|batch| batch.iter().map(|job| job.name.as_str()).collect())
        .collect();
    assert_eq!(names, vec![vec!["perl:runtime"], vec!["git"]]);
}

#[test]
fn test_import_then_check_erase_breaks_requirer() {
    let (_temp_dir, db_path) = setup_empty_db();
    import(&db_path, INSTALLED);
    let conn = db::open(&db_path).unwrap();

    let changeset = ChangesetManifest::parse(
        r#"
        [[erase]]
        name = "openssl:lib"
        version = "3.0.1"
        flavor = "is: x86_64"
        "#,
    )
    .unwrap()
    .to_changeset()
    .unwrap();

    let result = check_changeset(&SqliteIndex::new(&conn), &changeset, false).unwrap();
    assert!(result.failed.is_empty());
    assert_eq!(result.unresolvable.len(), 1);
    assert_eq!(result.unresolvable[0].requirer.name, "curl:lib");
    assert_eq!(result.unresolvable[0].removed[0].name, "openssl:lib");
}

#[test]
fn test_assumed_troves_layer_over_database() {
    let (_temp_dir, db_path) = setup_empty_db();
    import(&db_path, INSTALLED);
    let conn = db::open(&db_path).unwrap();

    let changeset = ChangesetManifest::parse(
        r#"
        [[install]]
        name = "jq"
        version = "1.7"
        requires = ["trove: oniguruma:lib"]
        "#,
    )
    .unwrap()
    .to_changeset()
    .unwrap();

    let database = SqliteIndex::new(&conn);
    let result = check_changeset(&database, &changeset, false).unwrap();
    assert_eq!(result.failed.len(), 1);

    let assumed = TroveManifest::parse(
        r#"
        [[trove]]
        name = "oniguruma:lib"
        version = "6.9"
        provides = ["trove: oniguruma:lib"]
        "#,
    )
    .unwrap();
    let mut extra = MemoryIndex::new();
    for entry in &assumed.trove {
        let deps = entry.deps().unwrap();
        extra.add(entry.spec().unwrap(), deps.requires, deps.provides).unwrap();
    }

    let layered = LayeredIndex::new(vec![&database as &dyn DependencyIndex, &extra]);
    let result = check_changeset(&layered, &changeset, false).unwrap();
    assert!(result.is_closed());
}

#[test]
fn test_remove_trove_updates_index() {
    let (_temp_dir, db_path) = setup_empty_db();
    import(&db_path, INSTALLED);
    let conn = db::open(&db_path).unwrap();

    let curl = TroveManifest::parse(INSTALLED).unwrap().trove[2].spec().unwrap();
    db::remove_trove(&conn, &curl).unwrap();

    let index = SqliteIndex::new(&conn);
    assert!(index.trove_deps(&curl).unwrap().is_none());
    let requirers = index
        .requirers_of(&common::deps(&["soname: ELF64/libssl.so.3(SysV x86_64)"]))
        .unwrap();
    assert!(requirers.is_empty());
}
