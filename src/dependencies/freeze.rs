// src/dependencies/freeze.rs

//! Compact frozen text form used for storage and exchange
//!
//! A dependency freezes to `name:flag:~flag:~!flag:!flag` with flags in
//! sorted order and literal colons doubled. A set freezes to
//! `tag#dep|tag#dep|...` in tag then name order; an empty set freezes to
//! `none`. A class that is present but empty freezes to a bare `tag#`.

use super::classes::ClassTag;
use super::dependency::Dependency;
use super::sense::{MergeType, Sense};
use super::set::DependencySet;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Frozen form of a set with no classes
pub const EMPTY_FROZEN: &str = "none";

fn escape(s: &str) -> String {
    s.replace(':', "::")
}

/// Split on single colons, turning `::` back into a literal colon
fn split_unescaped(frozen: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = frozen.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ':' {
            current.push(c);
        } else if chars.peek() == Some(&':') {
            chars.next();
            current.push(':');
        } else {
            parts.push(std::mem::take(&mut current));
        }
    }
    parts.push(current);
    parts
}

impl Dependency {
    /// Compact storage form
    pub fn freeze(&self) -> String {
        let mut frozen = escape(self.name());
        for (flag, sense) in self.flags() {
            frozen.push(':');
            frozen.push_str(sense.prefix());
            frozen.push_str(&escape(flag));
        }
        frozen
    }

    /// Rebuild a dependency from its frozen form
    pub fn thaw(frozen: &str) -> Result<Self> {
        let mut parts = split_unescaped(frozen).into_iter();
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(Error::ParseError(format!(
                "Missing dependency name in '{}'",
                frozen
            )));
        }

        let mut flags: Vec<(String, Sense)> = Vec::new();
        for part in parts {
            if part.is_empty() {
                return Err(Error::ParseError(format!("Empty flag in '{}'", frozen)));
            }
            let (sense, flag) = Sense::parse_with_name(&part)
                .map_err(|e| Error::ParseError(format!("Bad flag '{}' in '{}': {}", part, frozen, e)))?;
            flags.push((flag.to_string(), sense));
        }

        Dependency::with_flags(name, flags)
    }
}

/// Interning arena for thawed dependencies
///
/// Identical frozen text maps to one shared `Dependency`. Each solver run or
/// database reader owns its own cache; nothing is process-global.
#[derive(Debug, Default)]
pub struct DependencyCache {
    deps: HashMap<String, Arc<Dependency>>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thaw `frozen`, reusing an earlier result for the same text
    pub fn thaw(&mut self, frozen: &str) -> Result<Arc<Dependency>> {
        if let Some(dep) = self.deps.get(frozen) {
            return Ok(Arc::clone(dep));
        }
        let dep = Arc::new(Dependency::thaw(frozen)?);
        self.deps.insert(frozen.to_string(), Arc::clone(&dep));
        Ok(dep)
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}

impl DependencySet {
    /// Compact storage form, `none` when the set has no classes
    pub fn freeze(&self) -> String {
        let mut parts = Vec::new();
        for class in self.classes() {
            let tag = class.tag().tag_id();
            if class.is_empty() {
                parts.push(format!("{}#", tag));
                continue;
            }
            for dep in class.iter() {
                parts.push(format!("{}#{}", tag, dep.freeze()));
            }
        }

        if parts.is_empty() {
            EMPTY_FROZEN.to_string()
        } else {
            parts.join("|")
        }
    }

    /// Rebuild a set from its frozen form
    pub fn thaw(frozen: &str) -> Result<Self> {
        Self::thaw_with_cache(frozen, &mut DependencyCache::new())
    }

    /// Rebuild a set, sharing dependencies through `cache`
    pub fn thaw_with_cache(frozen: &str, cache: &mut DependencyCache) -> Result<Self> {
        let mut set = DependencySet::new();
        // Older databases store empty flavors as the empty string
        if frozen == EMPTY_FROZEN || frozen.is_empty() {
            return Ok(set);
        }

        for part in frozen.split('|') {
            let (tag, dep) = part.split_once('#').ok_or_else(|| {
                Error::ParseError(format!("Missing '#' in frozen dependency '{}'", part))
            })?;
            let tag = tag
                .parse::<u32>()
                .ok()
                .and_then(ClassTag::from_tag_id)
                .ok_or_else(|| Error::ParseError(format!("Unknown dependency class '{}'", tag)))?;

            if dep.is_empty() {
                set.add_empty_class(tag);
            } else {
                set.add_shared(tag, cache.thaw(dep)?, MergeType::Normal)?;
            }
        }

        trace!("thawed {} dependencies from '{}'", set.len(), frozen);
        Ok(set)
    }
}

impl Serialize for DependencySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.freeze())
    }
}

impl<'de> Deserialize<'de> for DependencySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let frozen = String::deserialize(deserializer)?;
        DependencySet::thaw(&frozen).map_err(serde::de::Error::custom)
    }
}
