// src/dependencies/classes.rs

//! Dependency class definitions
//!
//! Based on original Conary's numbered dependency classes. The tag ids are
//! part of the frozen text format and must never be renumbered.

use super::dependency::{check_name, Dependency};
use super::sense::MergeType;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Namespaces a dependency can live in
///
/// Declaration order matches the tag ids, so the derived `Ord` sorts by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassTag {
    /// ABI compatibility tag
    /// Example: abi: ELF64(SysV x86_64)
    Abi,

    /// Instruction set of a flavor (`is:` axis)
    /// Example: is: x86(i686 ~sse2)
    InstructionSet,

    /// Legacy soname dependency, kept for old frozen data
    OldSoname,

    /// File-based dependency (specific file must exist)
    /// Example: file: /usr/bin/python3
    File,

    /// Trove dependency
    /// Example: trove: openssl:lib
    Trove,

    /// Use flags of a flavor; holds a single synthetic `use` dependency
    Use,

    /// Shared library dependency
    /// Example: soname: ELF64/libssl.so.3(SysV x86_64)
    Soname,

    /// User account that must exist
    UserInfo,

    /// Group account that must exist
    GroupInfo,
}

impl ClassTag {
    /// Numeric tag used in the frozen form
    pub const fn tag_id(&self) -> u32 {
        match self {
            Self::Abi => 0,
            Self::InstructionSet => 1,
            Self::OldSoname => 2,
            Self::File => 3,
            Self::Trove => 4,
            Self::Use => 5,
            Self::Soname => 6,
            Self::UserInfo => 7,
            Self::GroupInfo => 8,
        }
    }

    /// Look up a class by its numeric tag
    pub fn from_tag_id(id: u32) -> Option<Self> {
        Self::all().iter().copied().find(|tag| tag.tag_id() == id)
    }

    /// Name used in the human-readable form (`soname: ...`)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Abi => "abi",
            Self::InstructionSet => "is",
            Self::OldSoname => "oldsoname",
            Self::File => "file",
            Self::Trove => "trove",
            Self::Use => "use",
            Self::Soname => "soname",
            Self::UserInfo => "userinfo",
            Self::GroupInfo => "groupinfo",
        }
    }

    /// Parse a class from its human-readable name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tag| tag.name() == name)
    }

    /// Return all dependency classes in tag order
    pub fn all() -> &'static [ClassTag] {
        &[
            Self::Abi,
            Self::InstructionSet,
            Self::OldSoname,
            Self::File,
            Self::Trove,
            Self::Use,
            Self::Soname,
            Self::UserInfo,
            Self::GroupInfo,
        ]
    }

    /// Class may hold at most one dependency
    pub fn just_one(&self) -> bool {
        matches!(self, Self::Use)
    }

    /// Flavor axes are written with the flavor grammar, not as dependencies
    pub fn is_flavor_axis(&self) -> bool {
        matches!(self, Self::Use | Self::InstructionSet)
    }

    /// Get a human-readable description of this dependency class
    pub fn description(&self) -> &'static str {
        match self {
            Self::Abi => "ABI compatibility",
            Self::InstructionSet => "Instruction set",
            Self::OldSoname => "Shared library (legacy)",
            Self::File => "File path",
            Self::Trove => "Trove",
            Self::Use => "Use flags",
            Self::Soname => "Shared library (soname)",
            Self::UserInfo => "User account",
            Self::GroupInfo => "Group account",
        }
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// All dependencies of one class, unique by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyClass {
    tag: ClassTag,
    members: BTreeMap<String, Arc<Dependency>>,
}

impl DependencyClass {
    /// Create an empty class
    pub fn new(tag: ClassTag) -> Self {
        Self {
            tag,
            members: BTreeMap::new(),
        }
    }

    pub(crate) fn with_member(tag: ClassTag, dep: Arc<Dependency>) -> Self {
        let mut members = BTreeMap::new();
        members.insert(dep.name().to_string(), dep);
        Self { tag, members }
    }

    pub fn tag(&self) -> ClassTag {
        self.tag
    }

    /// Add a dependency, merging flags with an existing one of the same name
    pub fn add(&mut self, dep: Dependency, merge: MergeType) -> Result<()> {
        self.add_shared(Arc::new(dep), merge)
    }

    /// Add an already shared dependency (as handed out by a `DependencyCache`)
    pub fn add_shared(&mut self, dep: Arc<Dependency>, merge: MergeType) -> Result<()> {
        check_name(dep.name())?;
        if let Some(existing) = self.members.get(dep.name()) {
            if **existing != *dep {
                let merged = existing.merge(&dep, merge)?;
                self.members.insert(merged.name().to_string(), Arc::new(merged));
            }
            return Ok(());
        }

        if self.tag.just_one() && !self.members.is_empty() {
            return Err(Error::InvalidDependency(format!(
                "{} class holds a single dependency, cannot add {}",
                self.tag, dep
            )));
        }

        self.members.insert(dep.name().to_string(), dep);
        Ok(())
    }

    /// Get a member by name
    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.members.get(name).map(|dep| dep.as_ref())
    }

    /// Members sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.members.values().map(|dep| dep.as_ref())
    }

    pub(crate) fn shared(&self) -> impl Iterator<Item = &Arc<Dependency>> {
        self.members.values()
    }

    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Dependency) -> bool,
    {
        self.members.retain(|_, dep| keep(dep));
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Score this (provided) class against a class of requirements
    ///
    /// Every required dependency needs a member of the same name; the
    /// per-dependency scores are summed. `None` when any requirement fails.
    pub fn score(&self, requirements: &DependencyClass) -> Option<i32> {
        if self.tag != requirements.tag {
            return None;
        }

        requirements.iter().try_fold(0, |total, required| {
            let provided = self.members.get(required.name())?;
            provided.score(required).map(|s| total + s)
        })
    }

    pub fn satisfies(&self, requirements: &DependencyClass) -> bool {
        self.score(requirements).is_some()
    }

    /// Merge every member of `other` into this class
    pub fn union(&mut self, other: &DependencyClass, merge: MergeType) -> Result<()> {
        for dep in other.shared() {
            self.add_shared(Arc::clone(dep), merge)?;
        }
        Ok(())
    }
}
