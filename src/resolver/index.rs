// src/resolver/index.rs

//! Dependency index lookups used by the solver
//!
//! The solver only ever asks two questions: who provides these
//! dependencies, and who requires something these provides satisfy.
//! `MemoryIndex` answers them for a batch of troves held in memory,
//! `crate::db::SqliteIndex` for the installed system, and `LayeredIndex`
//! unions several of them.

use crate::dependencies::{ClassTag, Dependency, DependencySet, MergeType};
use crate::error::Result;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

use super::job::TroveSpec;

/// Requires and provides of one trove
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TroveDeps {
    pub requires: DependencySet,
    pub provides: DependencySet,
}

/// Read-only dependency queries
///
/// All queries made during one solver call must see the same snapshot.
pub trait DependencyIndex {
    /// Troves providing at least one dependency of `deps`
    fn providers_of(&self, deps: &DependencySet) -> Result<Vec<TroveSpec>>;

    /// Troves requiring something `provides` satisfies, each with the
    /// requirements that matched
    fn requirers_of(&self, provides: &DependencySet) -> Result<Vec<(TroveSpec, DependencySet)>>;

    /// Requires and provides of a known trove
    fn trove_deps(&self, trove: &TroveSpec) -> Result<Option<TroveDeps>>;
}

/// True when `provides` satisfies the single requirement `required`
pub fn provides_dependency(provides: &DependencySet, tag: ClassTag, required: &Dependency) -> bool {
    provides
        .class(tag)
        .and_then(|class| class.get(required.name()))
        .is_some_and(|provided| provided.satisfies(required))
}

type DepKey = (ClassTag, String);

/// In-memory index over a batch of troves
#[derive(Debug, Default)]
pub struct MemoryIndex {
    troves: IndexMap<TroveSpec, TroveDeps>,
    provided_by: HashMap<DepKey, Vec<usize>>,
    required_by: HashMap<DepKey, Vec<usize>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a trove; adding the same trove again merges its dependencies
    pub fn add(&mut self, trove: TroveSpec, requires: DependencySet, provides: DependencySet) -> Result<()> {
        let (idx, existing) = match self.troves.get_full_mut(&trove) {
            Some((idx, _, deps)) => {
                deps.requires.union(&requires, MergeType::Normal)?;
                deps.provides.union(&provides, MergeType::Normal)?;
                (idx, true)
            }
            None => {
                let (idx, _) = self.troves.insert_full(
                    trove,
                    TroveDeps {
                        requires: requires.clone(),
                        provides: provides.clone(),
                    },
                );
                (idx, false)
            }
        };

        for (tag, dep) in provides.iter() {
            let owners = self.provided_by.entry((tag, dep.name().to_string())).or_default();
            if !existing || !owners.contains(&idx) {
                owners.push(idx);
            }
        }
        for (tag, dep) in requires.iter() {
            let owners = self.required_by.entry((tag, dep.name().to_string())).or_default();
            if !existing || !owners.contains(&idx) {
                owners.push(idx);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.troves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.troves.is_empty()
    }

    /// Indexed troves in insertion order
    pub fn troves(&self) -> impl Iterator<Item = (&TroveSpec, &TroveDeps)> {
        self.troves.iter()
    }
}

impl DependencyIndex for MemoryIndex {
    fn providers_of(&self, deps: &DependencySet) -> Result<Vec<TroveSpec>> {
        let mut found = IndexSet::new();
        for (tag, dep) in deps.iter() {
            let Some(owners) = self.provided_by.get(&(tag, dep.name().to_string())) else {
                continue;
            };
            for idx in owners {
                if let Some((_, trove_deps)) = self.troves.get_index(*idx)
                    && provides_dependency(&trove_deps.provides, tag, dep)
                {
                    found.insert(*idx);
                }
            }
        }

        Ok(found
            .into_iter()
            .filter_map(|idx| self.troves.get_index(idx).map(|(spec, _)| spec.clone()))
            .collect())
    }

    fn requirers_of(&self, provides: &DependencySet) -> Result<Vec<(TroveSpec, DependencySet)>> {
        let mut found: IndexMap<usize, DependencySet> = IndexMap::new();
        for (tag, provided) in provides.iter() {
            let Some(owners) = self.required_by.get(&(tag, provided.name().to_string())) else {
                continue;
            };
            for idx in owners {
                let Some(required) = self
                    .troves
                    .get_index(*idx)
                    .and_then(|(_, deps)| deps.requires.class(tag))
                    .and_then(|class| class.get(provided.name()))
                else {
                    continue;
                };
                if provided.satisfies(required) {
                    found
                        .entry(*idx)
                        .or_default()
                        .add_dep(tag, required.clone())?;
                }
            }
        }

        Ok(found
            .into_iter()
            .filter_map(|(idx, matched)| {
                self.troves
                    .get_index(idx)
                    .map(|(spec, _)| (spec.clone(), matched))
            })
            .collect())
    }

    fn trove_deps(&self, trove: &TroveSpec) -> Result<Option<TroveDeps>> {
        Ok(self.troves.get(trove).cloned())
    }
}

/// Union of several indexes, queried in order
pub struct LayeredIndex<'a> {
    layers: Vec<&'a dyn DependencyIndex>,
}

impl<'a> LayeredIndex<'a> {
    pub fn new(layers: Vec<&'a dyn DependencyIndex>) -> Self {
        Self { layers }
    }

    pub fn push(&mut self, layer: &'a dyn DependencyIndex) {
        self.layers.push(layer);
    }
}

impl DependencyIndex for LayeredIndex<'_> {
    fn providers_of(&self, deps: &DependencySet) -> Result<Vec<TroveSpec>> {
        let mut found = IndexSet::new();
        for layer in &self.layers {
            found.extend(layer.providers_of(deps)?);
        }
        Ok(found.into_iter().collect())
    }

    fn requirers_of(&self, provides: &DependencySet) -> Result<Vec<(TroveSpec, DependencySet)>> {
        let mut found: IndexMap<TroveSpec, DependencySet> = IndexMap::new();
        for layer in &self.layers {
            for (spec, matched) in layer.requirers_of(provides)? {
                found
                    .entry(spec)
                    .or_default()
                    .union(&matched, MergeType::Normal)?;
            }
        }
        Ok(found.into_iter().collect())
    }

    fn trove_deps(&self, trove: &TroveSpec) -> Result<Option<TroveDeps>> {
        for layer in &self.layers {
            if let Some(deps) = layer.trove_deps(trove)? {
                return Ok(Some(deps));
            }
        }
        Ok(None)
    }
}
