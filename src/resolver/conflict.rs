// src/resolver/conflict.rs

//! Dependency problems found while checking a changeset
//!
//! Both kinds are reported as data in `CheckResult`; neither is an error.

use crate::dependencies::DependencySet;
use serde::Serialize;

use super::job::TroveSpec;

/// A requirement of a trove being added that nothing satisfies after the change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyFailure {
    pub trove: TroveSpec,
    pub missing: DependencySet,
}

/// A requirement of a retained installed trove broken by removing its provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvableDependency {
    pub requirer: TroveSpec,
    pub missing: DependencySet,
    /// The troves being removed that provided it
    pub removed: Vec<TroveSpec>,
}

fn indented(deps: &DependencySet) -> String {
    deps.to_string()
        .lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

impl std::fmt::Display for DependencyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} requires:", self.trove)?;
        write!(f, "{}", indented(&self.missing))
    }
}

impl std::fmt::Display for UnresolvableDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let removed: Vec<String> = self.removed.iter().map(|t| t.to_string()).collect();
        writeln!(
            f,
            "{} would lose (removed with {}):",
            self.requirer,
            removed.join(", ")
        )?;
        write!(f, "{}", indented(&self.missing))
    }
}
