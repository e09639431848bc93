// src/manifest.rs

//! TOML manifests for installed troves and changesets
//!
//! Dependencies are written in the human-readable form
//! (`soname: ELF64/libc.so.6(SysV x86_64)`), flavors in the flavor grammar.
//!
//! ```toml
//! [[install]]
//! name = "curl:lib"
//! version = "8.6.0"
//! old_version = "8.5.0"
//! flavor = "ssl is: x86_64"
//! requires = ["soname: ELF64/libssl.so.3(SysV x86_64)"]
//! provides = ["trove: curl:lib"]
//!
//! [[erase]]
//! name = "wget:runtime"
//! version = "1.21"
//! ```

use crate::dependencies::{parse_dep_set, DependencySet};
use crate::error::{Error, Result};
use crate::flavor::{flavor_to_string, parse_flavor};
use crate::resolver::{Changeset, TroveAdd, TroveDeps, TroveJob, TroveSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Installed troves to record in the database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TroveManifest {
    #[serde(default)]
    pub trove: Vec<TroveEntry>,
}

/// One trove with its dependencies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TroveEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub flavor: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub provides: Vec<String>,
}

impl TroveEntry {
    pub fn spec(&self) -> Result<TroveSpec> {
        Ok(TroveSpec::new(
            self.name.clone(),
            self.version.clone(),
            parse_flavor(&self.flavor, None)?,
        ))
    }

    pub fn deps(&self) -> Result<TroveDeps> {
        Ok(TroveDeps {
            requires: parse_dep_set(&self.requires)?,
            provides: parse_dep_set(&self.provides)?,
        })
    }

    /// Build an entry from a spec and its dependencies
    pub fn from_parts(spec: &TroveSpec, deps: &TroveDeps) -> Self {
        Self {
            name: spec.name.clone(),
            version: spec.version.clone(),
            flavor: flavor_to_string(&spec.flavor),
            requires: dep_strings(&deps.requires),
            provides: dep_strings(&deps.provides),
        }
    }
}

fn dep_strings(set: &DependencySet) -> Vec<String> {
    set.iter().map(|(tag, dep)| format!("{}: {}", tag, dep)).collect()
}

impl TroveManifest {
    /// Parse a trove manifest from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a trove manifest from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::ParseError(format!("Failed to serialize manifest: {}", e)))
    }
}

/// A trove to add, optionally replacing an installed version
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub flavor: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub provides: Vec<String>,
    /// Installed version this replaces
    #[serde(default)]
    pub old_version: Option<String>,
    /// Flavor of the replaced version, defaults to `flavor`
    #[serde(default)]
    pub old_flavor: Option<String>,
    #[serde(default)]
    pub absolute: Option<bool>,
}

/// An installed trove to remove
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EraseEntry {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub flavor: String,
}

/// A changeset description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangesetManifest {
    #[serde(default)]
    pub install: Vec<InstallEntry>,
    #[serde(default)]
    pub erase: Vec<EraseEntry>,
}

impl ChangesetManifest {
    /// Parse a changeset manifest from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a changeset manifest from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Turn the manifest into a changeset the solver can check
    pub fn to_changeset(&self) -> Result<Changeset> {
        let mut changeset = Changeset::new();

        for entry in &self.install {
            let flavor = parse_flavor(&entry.flavor, None)?;
            let new = TroveSpec::new(entry.name.clone(), entry.version.clone(), flavor.clone());

            let mut job = match &entry.old_version {
                Some(old_version) => {
                    let old_flavor = match &entry.old_flavor {
                        Some(text) => parse_flavor(text, None)?,
                        None => flavor,
                    };
                    let old = TroveSpec::new(entry.name.clone(), old_version.clone(), old_flavor);
                    TroveJob::update(&old, &new)
                }
                None => TroveJob::install(&new),
            };
            if let Some(absolute) = entry.absolute {
                job.absolute = absolute;
            }

            changeset.installs.push(TroveAdd {
                job,
                requires: parse_dep_set(&entry.requires)?,
                provides: parse_dep_set(&entry.provides)?,
            });
        }

        for entry in &self.erase {
            changeset.erase(TroveSpec::new(
                entry.name.clone(),
                entry.version.clone(),
                parse_flavor(&entry.flavor, None)?,
            ));
        }

        Ok(changeset)
    }
}
