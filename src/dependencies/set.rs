// src/dependencies/set.rs

//! Heterogeneous sets of dependency classes
//!
//! A `DependencySet` is what a trove requires, what it provides, or its
//! flavor. A class may be present but empty: that records "this axis was
//! mentioned with nothing on it", which only matters when parsing and
//! scoring flavors.

use super::classes::{ClassTag, DependencyClass};
use super::dependency::{check_name, Dependency};
use super::sense::MergeType;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Dependencies grouped by class, at most one class per tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DependencySet {
    classes: BTreeMap<ClassTag, DependencyClass>,
}

impl DependencySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one dependency
    pub fn single(tag: ClassTag, dep: Dependency) -> Result<Self> {
        check_name(dep.name())?;
        Ok(Self::single_shared(tag, Arc::new(dep)))
    }

    pub(crate) fn single_shared(tag: ClassTag, dep: Arc<Dependency>) -> Self {
        let mut classes = BTreeMap::new();
        classes.insert(tag, DependencyClass::with_member(tag, dep));
        Self { classes }
    }

    /// Add a dependency, merging flags with the `Normal` policy
    pub fn add_dep(&mut self, tag: ClassTag, dep: Dependency) -> Result<()> {
        self.add_dep_with(tag, dep, MergeType::Normal)
    }

    /// Add a dependency with an explicit merge policy
    pub fn add_dep_with(&mut self, tag: ClassTag, dep: Dependency, merge: MergeType) -> Result<()> {
        self.add_shared(tag, Arc::new(dep), merge)
    }

    pub(crate) fn add_shared(&mut self, tag: ClassTag, dep: Arc<Dependency>, merge: MergeType) -> Result<()> {
        self.classes
            .entry(tag)
            .or_insert_with(|| DependencyClass::new(tag))
            .add_shared(dep, merge)
    }

    /// Mark a class as present without adding anything to it
    pub fn add_empty_class(&mut self, tag: ClassTag) {
        self.classes
            .entry(tag)
            .or_insert_with(|| DependencyClass::new(tag));
    }

    /// Put a whole class in place, replacing any class with the same tag
    pub fn insert_class(&mut self, class: DependencyClass) -> Option<DependencyClass> {
        self.classes.insert(class.tag(), class)
    }

    pub fn has_class(&self, tag: ClassTag) -> bool {
        self.classes.contains_key(&tag)
    }

    pub fn class(&self, tag: ClassTag) -> Option<&DependencyClass> {
        self.classes.get(&tag)
    }

    pub fn remove_class(&mut self, tag: ClassTag) -> Option<DependencyClass> {
        self.classes.remove(&tag)
    }

    /// Classes in tag order, including empty ones
    pub fn classes(&self) -> impl Iterator<Item = &DependencyClass> {
        self.classes.values()
    }

    /// Every dependency with its class, in tag then name order
    pub fn iter(&self) -> impl Iterator<Item = (ClassTag, &Dependency)> {
        self.classes
            .values()
            .flat_map(|class| class.iter().map(move |dep| (class.tag(), dep)))
    }

    pub(crate) fn iter_shared(&self) -> impl Iterator<Item = (ClassTag, &Arc<Dependency>)> {
        self.classes
            .values()
            .flat_map(|class| class.shared().map(move |dep| (class.tag(), dep)))
    }

    /// True when no class holds a dependency (empty classes do not count)
    pub fn is_empty(&self) -> bool {
        self.classes.values().all(|class| class.is_empty())
    }

    /// Number of dependencies across all classes
    pub fn len(&self) -> usize {
        self.classes.values().map(|class| class.len()).sum()
    }

    /// Merge `other` into this set
    pub fn union(&mut self, other: &DependencySet, merge: MergeType) -> Result<()> {
        for class in other.classes.values() {
            self.classes
                .entry(class.tag())
                .or_insert_with(|| DependencyClass::new(class.tag()))
                .union(class, merge)?;
        }
        Ok(())
    }

    /// Dependencies that appear, identically, in both sets
    pub fn intersection(&self, other: &DependencySet) -> DependencySet {
        self.filter_members(|tag, dep| {
            other
                .class(tag)
                .and_then(|class| class.get(dep.name()))
                .is_some_and(|theirs| theirs == dep)
        })
    }

    /// Dependencies of this set that do not appear identically in `other`
    pub fn difference(&self, other: &DependencySet) -> DependencySet {
        self.filter_members(|tag, dep| {
            !other
                .class(tag)
                .and_then(|class| class.get(dep.name()))
                .is_some_and(|theirs| theirs == dep)
        })
    }

    fn filter_members<F>(&self, keep: F) -> DependencySet
    where
        F: Fn(ClassTag, &Dependency) -> bool,
    {
        let mut classes = BTreeMap::new();
        for class in self.classes.values() {
            let mut kept = class.clone();
            kept.retain(|dep| keep(class.tag(), dep));
            if !kept.is_empty() {
                classes.insert(class.tag(), kept);
            }
        }
        DependencySet { classes }
    }

    /// Score this (provided) set against a set of requirements
    ///
    /// Requirement classes that are present but empty are skipped. Every
    /// other requirement class must exist here and be satisfied.
    pub fn score(&self, requirements: &DependencySet) -> Option<i32> {
        requirements
            .classes
            .values()
            .filter(|class| !class.is_empty())
            .try_fold(0, |total, required| {
                let provided = self.classes.get(&required.tag())?;
                provided.score(required).map(|s| total + s)
            })
    }

    pub fn satisfies(&self, requirements: &DependencySet) -> bool {
        self.score(requirements).is_some()
    }
}

impl fmt::Display for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .iter()
            .map(|(tag, dep)| format!("{}: {}", tag, dep))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}
