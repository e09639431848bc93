// tests/solver.rs

//! Changeset closure and ordering against the installed database and an
//! in-memory index.

mod common;

use common::{deps, installed, setup_db_with, spec, Installed};
use conary_deps::db::SqliteIndex;
use conary_deps::dependencies::DependencySet;
use conary_deps::flavor::parse_flavor;
use conary_deps::resolver::{
    check_changeset, Changeset, CheckResult, DependencyIndex, MemoryIndex,
};
use conary_deps::Error;

fn memory_index(troves: &[Installed]) -> MemoryIndex {
    let mut index = MemoryIndex::new();
    for (spec, requires, provides) in troves {
        index.add(spec.clone(), deps(requires), deps(provides)).unwrap();
    }
    index
}

fn batches(result: &CheckResult) -> Vec<Vec<String>> {
    result
        .ordering
        .as_ref()
        .expect("ordering was requested")
        .iter()
        .map(|batch| batch.iter().map(|job| job.name.clone()).collect())
        .collect()
}

/// Run the same check against both index backends and insist they agree.
fn check_both(
    installed: &[Installed],
    changeset: &Changeset,
) -> CheckResult {
    let memory = memory_index(installed);
    let from_memory = check_changeset(&memory, changeset, true).unwrap();

    let (_dir, _path, conn) = setup_db_with(installed);
    let sqlite = SqliteIndex::new(&conn);
    let from_sqlite = check_changeset(&sqlite, changeset, true).unwrap();

    assert_eq!(from_memory, from_sqlite);
    from_memory
}

#[test]
fn test_unresolved_requirement_is_reported() {
    let mut changeset = Changeset::new();
    changeset.install(
        spec("x", "1.0", ""),
        deps(&["soname: ELF64/libfoo.so"]),
        DependencySet::new(),
    );

    let result = check_both(&[], &changeset);
    assert!(!result.is_closed());
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].trove, spec("x", "1.0", ""));
    assert_eq!(result.failed[0].missing, deps(&["soname: ELF64/libfoo.so"]));
    assert_eq!(batches(&result), vec![vec!["x"]]);
}

#[test]
fn test_new_needs_new_orders_provider_first() {
    let mut changeset = Changeset::new();
    changeset
        .install(spec("x", "1.0", ""), deps(&["trove: y:lib"]), DependencySet::new())
        .install(spec("y:lib", "1.0", ""), DependencySet::new(), deps(&["trove: y:lib"]));

    let result = check_both(&[], &changeset);
    assert!(result.is_closed());
    assert_eq!(batches(&result), vec![vec!["y:lib"], vec!["x"]]);
}

#[test]
fn test_removal_breaks_retained_requirer() {
    let troves = vec![
        installed(spec("z:lib", "1.0", ""), &[], &["trove: z:lib"]),
        installed(spec("w", "1.0", ""), &["trove: z:lib"], &["trove: w"]),
    ];
    let mut changeset = Changeset::new();
    changeset.erase(spec("z:lib", "1.0", ""));

    let result = check_both(&troves, &changeset);
    assert!(result.failed.is_empty());
    assert_eq!(result.unresolvable.len(), 1);

    let broken = &result.unresolvable[0];
    assert_eq!(broken.requirer, spec("w", "1.0", ""));
    assert_eq!(broken.missing, deps(&["trove: z:lib"]));
    assert_eq!(broken.removed, vec![spec("z:lib", "1.0", "")]);
}

#[test]
fn test_removal_of_flavored_provider_breaks_requirer() {
    // Every sense prefix plus arch flags: the stored flavor must read back
    // equal so the erased provider is recognised as going away
    let flavor = "~!x,~vmware,!debug,ssl is: x86(i686,~!3dnow,~sse2)";
    let troves = vec![
        installed(spec("z:lib", "1.0", flavor), &[], &["trove: z:lib"]),
        installed(spec("w", "1.0", ""), &["trove: z:lib"], &["trove: w"]),
    ];
    let mut changeset = Changeset::new();
    changeset.erase(spec("z:lib", "1.0", flavor));

    let result = check_both(&troves, &changeset);
    assert_eq!(result.unresolvable.len(), 1);
    assert_eq!(result.unresolvable[0].removed, vec![spec("z:lib", "1.0", flavor)]);

    // A space after a sense prefix is malformed rather than a new flag name
    assert!(matches!(parse_flavor("~ !x", None), Err(Error::ParseError(_))));
}

#[test]
fn test_replacing_provider_cancels_edges() {
    let troves = vec![
        installed(spec("y:lib", "1.0", ""), &[], &["trove: y:lib"]),
        installed(spec("w", "1.0", ""), &["trove: y:lib"], &[]),
    ];
    let mut changeset = Changeset::new();
    changeset
        .install(spec("y:lib", "2.0", ""), DependencySet::new(), deps(&["trove: y:lib"]))
        .erase(spec("y:lib", "1.0", ""));

    let result = check_both(&troves, &changeset);
    assert!(result.is_closed());
    // No constraint between the two jobs: they come out in job order
    let ordering = result.ordering.unwrap();
    assert_eq!(ordering.len(), 2);
    assert!(!ordering[0][0].is_erase());
    assert!(ordering[1][0].is_erase());
}

#[test]
fn test_remaining_provider_keeps_requirer_satisfied() {
    let troves = vec![
        installed(spec("openssl:lib", "3.0", ""), &[], &["soname: ELF64/libssl.so.3(SysV x86_64)"]),
        installed(spec("openssl-compat:lib", "3.0", ""), &[], &["soname: ELF64/libssl.so.3(SysV x86_64)"]),
        installed(spec("curl:lib", "8.5", ""), &["soname: ELF64/libssl.so.3(SysV)"], &[]),
    ];
    let mut changeset = Changeset::new();
    changeset.erase(spec("openssl:lib", "3.0", ""));

    let result = check_both(&troves, &changeset);
    assert!(result.is_closed());
}

#[test]
fn test_flavor_distinguishes_installed_troves() {
    let troves = vec![
        installed(spec("glibc:lib", "2.39", "is: x86_64"), &[], &["soname: ELF64/libc.so.6(SysV x86_64)"]),
        installed(spec("glibc:lib", "2.39", "is: x86"), &[], &["soname: ELF32/libc.so.6(SysV x86)"]),
        installed(spec("bash", "5.2", "is: x86"), &["soname: ELF32/libc.so.6(SysV x86)"], &[]),
    ];
    let mut changeset = Changeset::new();
    changeset.erase(spec("glibc:lib", "2.39", "is: x86_64"));
    assert!(check_both(&troves, &changeset).is_closed());

    let mut changeset = Changeset::new();
    changeset.erase(spec("glibc:lib", "2.39", "is: x86"));
    let result = check_both(&troves, &changeset);
    assert_eq!(result.unresolvable.len(), 1);
    assert_eq!(result.unresolvable[0].requirer.name, "bash");
}

#[test]
fn test_update_chain_with_cycle() {
    let troves = vec![
        installed(spec("perl", "5.36", ""), &["trove: perl-libs"], &["trove: perl"]),
        installed(spec("perl-libs", "5.36", ""), &["trove: perl"], &["trove: perl-libs"]),
    ];
    let mut changeset = Changeset::new();
    changeset
        .update(
            spec("perl", "5.36", ""),
            spec("perl", "5.38", ""),
            deps(&["trove: perl-libs"]),
            deps(&["trove: perl"]),
        )
        .update(
            spec("perl-libs", "5.36", ""),
            spec("perl-libs", "5.38", ""),
            deps(&["trove: perl"]),
            deps(&["trove: perl-libs"]),
        )
        .install(spec("cpan", "1.0", ""), deps(&["trove: perl"]), DependencySet::new());

    let result = check_both(&troves, &changeset);
    assert!(result.is_closed());
    assert_eq!(batches(&result), vec![vec!["perl", "perl-libs"], vec!["cpan"]]);
}

#[test]
fn test_closure_check_without_ordering() {
    let index = memory_index(&[]);
    let mut changeset = Changeset::new();
    changeset.install(spec("x", "1.0", ""), DependencySet::new(), DependencySet::new());

    let result = check_changeset(&index as &dyn DependencyIndex, &changeset, false).unwrap();
    assert!(result.is_closed());
    assert!(result.ordering.is_none());
}
