// src/resolver/plan.rs

//! Changeset check results

use serde::Serialize;

use super::conflict::{DependencyFailure, UnresolvableDependency};
use super::job::TroveJob;

/// Result of checking a changeset for dependency closure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Requirements of added troves nothing satisfies afterwards
    pub failed: Vec<DependencyFailure>,
    /// Requirements of retained troves broken by the removals
    pub unresolvable: Vec<UnresolvableDependency>,
    /// Jobs in batches, each batch applied as one unit (only when requested)
    pub ordering: Option<Vec<Vec<TroveJob>>>,
}

impl CheckResult {
    /// True when every requirement is met after the change
    pub fn is_closed(&self) -> bool {
        self.failed.is_empty() && self.unresolvable.is_empty()
    }
}

impl std::fmt::Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_closed() {
            writeln!(f, "Dependencies are satisfied")?;
        }
        if !self.failed.is_empty() {
            writeln!(f, "Unresolved dependencies:")?;
            for failure in &self.failed {
                writeln!(f, "  {}", failure)?;
            }
        }
        if !self.unresolvable.is_empty() {
            writeln!(f, "Broken by removal:")?;
            for broken in &self.unresolvable {
                writeln!(f, "  {}", broken)?;
            }
        }
        if let Some(batches) = &self.ordering {
            writeln!(f, "Job order:")?;
            for (i, batch) in batches.iter().enumerate() {
                let jobs: Vec<String> = batch.iter().map(|job| job.to_string()).collect();
                writeln!(f, "  {}. {}", i + 1, jobs.join(", "))?;
            }
        }
        Ok(())
    }
}
