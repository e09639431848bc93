// src/dependencies/dependency.rs

//! A single named dependency with flags

use super::sense::{MergeType, Sense};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Why `flag` cannot be used as a flag name, if it cannot
///
/// Sense prefixes would be read back as a different sense, separators
/// would split the flag when frozen, parsed or displayed.
pub(crate) fn flag_name_problem(flag: &str) -> Option<&'static str> {
    if flag.is_empty() {
        Some("is empty")
    } else if flag.starts_with(['~', '!']) {
        Some("starts with a sense prefix")
    } else if flag.starts_with(':') {
        Some("starts with ':'")
    } else if flag.chars().any(char::is_whitespace) {
        Some("contains whitespace")
    } else if flag.contains(['|', ',', '(', ')']) {
        Some("contains a separator")
    } else {
        None
    }
}

/// Reject dependency names the frozen set form cannot carry
pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidDependency("Empty dependency name".to_string()));
    }
    if name.contains('|') {
        return Err(Error::InvalidDependency(format!(
            "Dependency name '{}' contains '|'",
            name
        )));
    }
    Ok(())
}

/// A named capability plus flag senses, e.g. `libc.so.6(GLIBC_2.2.5 SysV x86_64)`
///
/// Values are immutable once built; merging produces a new dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    name: String,
    flags: BTreeMap<String, Sense>,
}

impl Dependency {
    /// Create a dependency without flags
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: BTreeMap::new(),
        }
    }

    /// Create a dependency with flags
    ///
    /// Flags given as `Sense::Unspecified` carry no information and are
    /// dropped. Flag names that would not survive the frozen or displayed
    /// forms are rejected.
    pub fn with_flags<I, S>(name: impl Into<String>, flags: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Sense)>,
        S: Into<String>,
    {
        let mut checked = BTreeMap::new();
        for (flag, sense) in flags {
            let flag = flag.into();
            if let Some(problem) = flag_name_problem(&flag) {
                return Err(Error::InvalidDependency(format!("Flag '{}' {}", flag, problem)));
            }
            if sense != Sense::Unspecified {
                checked.insert(flag, sense);
            }
        }
        Ok(Self {
            name: name.into(),
            flags: checked,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Flags sorted by name
    pub fn flags(&self) -> &BTreeMap<String, Sense> {
        &self.flags
    }

    pub fn has_flags(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Sense this dependency gives `flag`, `Unspecified` when absent
    pub fn sense_of(&self, flag: &str) -> Sense {
        self.flags.get(flag).copied().unwrap_or(Sense::Unspecified)
    }

    /// Score how well this (provided) dependency meets `required`
    ///
    /// Returns `None` when the names differ or any flag pair conflicts.
    pub fn score(&self, required: &Dependency) -> Option<i32> {
        if self.name != required.name {
            return None;
        }

        required
            .flags
            .iter()
            .try_fold(0, |total, (flag, sense)| {
                Sense::score(self.sense_of(flag), *sense).map(|s| total + s)
            })
    }

    pub fn satisfies(&self, required: &Dependency) -> bool {
        self.score(required).is_some()
    }

    /// Merge the flags of `other` into a copy of this dependency
    pub fn merge(&self, other: &Dependency, merge: MergeType) -> Result<Dependency> {
        let mut flags = self.flags.clone();

        for (flag, incoming) in &other.flags {
            let existing = self.sense_of(flag);
            match Sense::merge(flag, existing, *incoming, merge)? {
                Some(sense) if sense != Sense::Unspecified => {
                    flags.insert(flag.clone(), sense);
                }
                _ => {
                    flags.remove(flag);
                }
            }
        }

        Ok(Self {
            name: self.name.clone(),
            flags,
        })
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.flags.is_empty() {
            return Ok(());
        }

        let flags: Vec<String> = self
            .flags
            .iter()
            .map(|(flag, sense)| format!("{}{}", sense.prefix(), flag))
            .collect();
        write!(f, "({})", flags.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(name: &str, flags: &[(&str, Sense)]) -> Dependency {
        Dependency::with_flags(name, flags.iter().map(|(f, s)| (*f, *s))).unwrap()
    }

    #[test]
    fn test_display() {
        assert_eq!(Dependency::new("foo:lib").to_string(), "foo:lib");
        let d = dep(
            "libc.so.6",
            &[("SysV", Sense::Required), ("x86_64", Sense::Required), ("debug", Sense::Disallowed)],
        );
        assert_eq!(d.to_string(), "libc.so.6(SysV !debug x86_64)");
    }

    #[test]
    fn test_unspecified_flags_dropped() {
        let d = dep("foo", &[("a", Sense::Unspecified), ("b", Sense::Required)]);
        assert_eq!(d.flags().len(), 1);
        assert_eq!(d.sense_of("a"), Sense::Unspecified);
    }

    #[test]
    fn test_with_flags_rejects_unsafe_names() {
        for flag in ["!x", "~x", ":x", "a b", "a|b", "a,b", "a(b", ""] {
            let result = Dependency::with_flags("foo", [(flag, Sense::Required)]);
            assert!(matches!(result, Err(Error::InvalidDependency(_))), "{flag:?}");
        }
        // Colons inside a flag are escaped when frozen
        assert!(Dependency::with_flags("foo", [("a:b", Sense::Preferred)]).is_ok());
    }

    #[test]
    fn test_check_name() {
        assert!(check_name("/usr/lib/libfoo.so").is_ok());
        assert!(matches!(check_name("/usr/lib/a|b"), Err(Error::InvalidDependency(_))));
        assert!(check_name("").is_err());
    }

    #[test]
    fn test_score_requires_matching_name() {
        assert_eq!(Dependency::new("foo").score(&Dependency::new("bar")), None);
        assert_eq!(Dependency::new("foo").score(&Dependency::new("foo")), Some(0));
    }

    #[test]
    fn test_self_satisfaction_all_required() {
        let d = dep("libc.so.6", &[("a", Sense::Required), ("b", Sense::Required), ("c", Sense::Required)]);
        assert_eq!(d.score(&d), Some(6));
    }

    #[test]
    fn test_self_satisfaction_mixed_senses() {
        let d = dep(
            "x86",
            &[("i686", Sense::Required), ("mmx", Sense::Disallowed), ("sse", Sense::Preferred), ("3dnow", Sense::PreferNot)],
        );
        // Every sense scores its column maximum against itself
        assert_eq!(d.score(&d), Some(2 + 2 + 2 + 1));
    }

    #[test]
    fn test_missing_required_flag_conflicts() {
        let provided = dep("libc.so.6", &[("SysV", Sense::Required)]);
        let required = dep("libc.so.6", &[("SysV", Sense::Required), ("GLIBC_2.34", Sense::Required)]);
        assert!(!provided.satisfies(&required));
        assert!(required.satisfies(&provided));
    }

    #[test]
    fn test_merge_idempotent() {
        let d = dep("use", &[("ssl", Sense::Required), ("debug", Sense::PreferNot)]);
        assert_eq!(d.merge(&d, MergeType::Normal).unwrap(), d);
    }

    #[test]
    fn test_merge_drop_conflicts_removes_flag() {
        let a = dep("use", &[("ssl", Sense::Required), ("gtk", Sense::Required)]);
        let b = dep("use", &[("ssl", Sense::Disallowed), ("qt", Sense::Preferred)]);
        let merged = a.merge(&b, MergeType::DropConflicts).unwrap();
        assert_eq!(merged.sense_of("ssl"), Sense::Unspecified);
        assert_eq!(merged.sense_of("gtk"), Sense::Required);
        assert_eq!(merged.sense_of("qt"), Sense::Preferred);
        assert!(a.merge(&b, MergeType::Normal).is_err());
    }
}
