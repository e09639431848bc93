// src/resolver/job.rs

//! Changeset operation records
//!
//! A changeset is a list of trove jobs: installs (optionally replacing an
//! older version) and erases. The solver reads requires and provides for
//! installed troves from a `DependencyIndex`; for troves being added they
//! travel with the job.

use crate::dependencies::DependencySet;
use crate::flavor::flavor_to_string;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One concrete trove: name, version and flavor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TroveSpec {
    pub name: String,
    pub version: String,
    pub flavor: DependencySet,
}

impl TroveSpec {
    pub fn new(name: impl Into<String>, version: impl Into<String>, flavor: DependencySet) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            flavor,
        }
    }
}

impl fmt::Display for TroveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.version)?;
        let flavor = flavor_to_string(&self.flavor);
        if !flavor.is_empty() {
            write!(f, "[{}]", flavor)?;
        }
        Ok(())
    }
}

/// Version and flavor of one side of a job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionFlavor {
    pub version: String,
    pub flavor: DependencySet,
}

impl VersionFlavor {
    pub fn new(version: impl Into<String>, flavor: DependencySet) -> Self {
        Self {
            version: version.into(),
            flavor,
        }
    }
}

/// A single operation in a changeset
///
/// `old` only: erase. `new` only: fresh install. Both: update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TroveJob {
    pub name: String,
    pub old: Option<VersionFlavor>,
    pub new: Option<VersionFlavor>,
    /// Absolute changesets carry the whole trove rather than a diff
    pub absolute: bool,
}

impl TroveJob {
    pub fn install(spec: &TroveSpec) -> Self {
        Self {
            name: spec.name.clone(),
            old: None,
            new: Some(VersionFlavor::new(spec.version.clone(), spec.flavor.clone())),
            absolute: true,
        }
    }

    pub fn update(old: &TroveSpec, new: &TroveSpec) -> Self {
        Self {
            name: new.name.clone(),
            old: Some(VersionFlavor::new(old.version.clone(), old.flavor.clone())),
            new: Some(VersionFlavor::new(new.version.clone(), new.flavor.clone())),
            absolute: false,
        }
    }

    pub fn erase(spec: &TroveSpec) -> Self {
        Self {
            name: spec.name.clone(),
            old: Some(VersionFlavor::new(spec.version.clone(), spec.flavor.clone())),
            new: None,
            absolute: false,
        }
    }

    pub fn is_erase(&self) -> bool {
        self.new.is_none()
    }

    /// The trove this job takes off the system, if any
    pub fn old_spec(&self) -> Option<TroveSpec> {
        self.old
            .as_ref()
            .map(|vf| TroveSpec::new(self.name.clone(), vf.version.clone(), vf.flavor.clone()))
    }

    /// The trove this job puts on the system, if any
    pub fn new_spec(&self) -> Option<TroveSpec> {
        self.new
            .as_ref()
            .map(|vf| TroveSpec::new(self.name.clone(), vf.version.clone(), vf.flavor.clone()))
    }
}

impl fmt::Display for TroveJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.old_spec(), self.new_spec()) {
            (Some(old), Some(new)) => write!(f, "update {} -> {}", old, new),
            (None, Some(new)) => write!(f, "install {}", new),
            (Some(old), None) => write!(f, "erase {}", old),
            (None, None) => write!(f, "noop {}", self.name),
        }
    }
}

/// A trove being added along with its dependency data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TroveAdd {
    pub job: TroveJob,
    pub requires: DependencySet,
    pub provides: DependencySet,
}

impl TroveAdd {
    /// The trove being added
    pub fn spec(&self) -> Option<TroveSpec> {
        self.job.new_spec()
    }
}

/// Troves to add and remove as one operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub installs: Vec<TroveAdd>,
    pub erases: Vec<TroveSpec>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fresh install
    pub fn install(&mut self, spec: TroveSpec, requires: DependencySet, provides: DependencySet) -> &mut Self {
        self.installs.push(TroveAdd {
            job: TroveJob::install(&spec),
            requires,
            provides,
        });
        self
    }

    /// Replace `old` with `new`
    pub fn update(
        &mut self,
        old: TroveSpec,
        new: TroveSpec,
        requires: DependencySet,
        provides: DependencySet,
    ) -> &mut Self {
        self.installs.push(TroveAdd {
            job: TroveJob::update(&old, &new),
            requires,
            provides,
        });
        self
    }

    pub fn erase(&mut self, spec: TroveSpec) -> &mut Self {
        self.erases.push(spec);
        self
    }

    /// Every job, installs first
    pub fn jobs(&self) -> Vec<TroveJob> {
        self.installs
            .iter()
            .map(|add| add.job.clone())
            .chain(self.erases.iter().map(TroveJob::erase))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.installs.is_empty() && self.erases.is_empty()
    }
}
