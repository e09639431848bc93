// src/dependencies/sense.rs

//! Flag senses and the scoring table
//!
//! Every flag on a dependency carries a sense. Syntax follows original
//! Conary: `ssl` (required), `!debug` (disallowed), `~vmware` (preferred),
//! `~!xen` (prefer not).

use super::dependency::flag_name_problem;
use crate::error::{Error, Result};
use std::fmt;

/// Strength and polarity of a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sense {
    /// Flag not mentioned at all
    Unspecified,
    /// Flag must be present (no prefix)
    Required,
    /// Soft preference for the flag (~ prefix)
    Preferred,
    /// Soft preference against the flag (~! prefix)
    PreferNot,
    /// Flag must be absent (! prefix)
    Disallowed,
}

impl Sense {
    /// Get the string prefix for this sense
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Unspecified | Self::Required => "",
            Self::Preferred => "~",
            Self::PreferNot => "~!",
            Self::Disallowed => "!",
        }
    }

    /// Required and Disallowed dominate the soft senses when merging
    pub fn is_strong(&self) -> bool {
        matches!(self, Self::Required | Self::Disallowed)
    }

    /// Parse a sense and name from a string like `~!xen`
    /// Returns (sense, remaining name)
    pub fn parse_with_name(s: &str) -> Result<(Self, &str)> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::ParseError("Empty flag".to_string()));
        }

        // Check longer prefixes first
        let (sense, name) = if let Some(rest) = s.strip_prefix("~!") {
            (Self::PreferNot, rest)
        } else if let Some(rest) = s.strip_prefix('~') {
            (Self::Preferred, rest)
        } else if let Some(rest) = s.strip_prefix('!') {
            (Self::Disallowed, rest)
        } else {
            (Self::Required, s)
        };

        if name.is_empty() {
            return Err(Error::ParseError(format!(
                "Missing flag name after '{}'",
                sense.prefix()
            )));
        }
        if let Some(problem) = flag_name_problem(name) {
            return Err(Error::ParseError(format!("Bad flag '{}': name {}", s, problem)));
        }

        Ok((sense, name))
    }

    /// Score one provided flag sense against one required sense
    ///
    /// `None` means the pair conflicts and the requirement cannot be met.
    pub fn score(provided: Sense, required: Sense) -> Option<i32> {
        use Sense::*;

        match (provided, required) {
            (_, Unspecified) => Some(0),

            (Unspecified, Required) => None,
            (Unspecified, Disallowed) => Some(0),
            (Unspecified, Preferred) => Some(-1),
            (Unspecified, PreferNot) => Some(1),

            (Required, Required) => Some(2),
            (Required, Disallowed) => None,
            (Required, Preferred) => Some(1),
            (Required, PreferNot) => None,

            (Disallowed, Required) => None,
            (Disallowed, Disallowed) => Some(2),
            (Disallowed, Preferred) => None,
            (Disallowed, PreferNot) => Some(1),

            (Preferred, Required) => Some(1),
            (Preferred, Disallowed) => None,
            (Preferred, Preferred) => Some(2),
            (Preferred, PreferNot) => Some(-1),

            (PreferNot, Required) => Some(-2),
            (PreferNot, Disallowed) => Some(1),
            (PreferNot, Preferred) => Some(-1),
            (PreferNot, PreferNot) => Some(1),
        }
    }

    /// Combine an existing sense for `flag` with an incoming one
    ///
    /// Returns `Ok(None)` when the flag should be dropped from the result.
    pub fn merge(flag: &str, existing: Sense, incoming: Sense, merge: MergeType) -> Result<Option<Sense>> {
        if incoming == Sense::Unspecified || existing == incoming {
            return Ok(Some(existing));
        }
        if existing == Sense::Unspecified {
            return Ok(Some(incoming));
        }

        match merge {
            MergeType::Override => Ok(Some(incoming)),
            MergeType::Prefs => {
                if existing == Sense::Disallowed && incoming == Sense::PreferNot {
                    Ok(Some(existing))
                } else {
                    Ok(Some(incoming))
                }
            }
            MergeType::Normal | MergeType::DropConflicts => {
                if existing.is_strong() == incoming.is_strong() {
                    // Same strength, different senses: opposite polarity
                    if merge == MergeType::DropConflicts {
                        return Ok(None);
                    }
                    return Err(Error::FlagConflict {
                        first: format!("{}{}", existing.prefix(), flag),
                        second: format!("{}{}", incoming.prefix(), flag),
                    });
                }
                if incoming.is_strong() {
                    Ok(Some(incoming))
                } else {
                    Ok(Some(existing))
                }
            }
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "unspecified",
            Self::Required => "required",
            Self::Preferred => "preferred",
            Self::PreferNot => "prefernot",
            Self::Disallowed => "disallowed",
        };
        write!(f, "{}", name)
    }
}

/// How to combine flags when two dependencies of the same name meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeType {
    /// Opposite senses of equal strength are an error
    #[default]
    Normal,
    /// The incoming sense always wins
    Override,
    /// Like Override, but a PreferNot never weakens an existing Disallowed
    Prefs,
    /// Opposite senses of equal strength remove the flag
    DropConflicts,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Sense; 5] = [
        Sense::Unspecified,
        Sense::Required,
        Sense::Preferred,
        Sense::PreferNot,
        Sense::Disallowed,
    ];

    #[test]
    fn test_parse_required() {
        let (sense, name) = Sense::parse_with_name("ssl").unwrap();
        assert_eq!(sense, Sense::Required);
        assert_eq!(name, "ssl");
    }

    #[test]
    fn test_parse_all_prefixes() {
        assert_eq!(Sense::parse_with_name("!debug").unwrap(), (Sense::Disallowed, "debug"));
        assert_eq!(Sense::parse_with_name("~vmware").unwrap(), (Sense::Preferred, "vmware"));
        assert_eq!(Sense::parse_with_name("~!xen").unwrap(), (Sense::PreferNot, "xen"));
        assert_eq!(Sense::parse_with_name("  ~!xen  ").unwrap(), (Sense::PreferNot, "xen"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Sense::parse_with_name("").is_err());
        assert!(Sense::parse_with_name("   ").is_err());
        assert!(Sense::parse_with_name("!").is_err());
        assert!(Sense::parse_with_name("~").is_err());
        assert!(Sense::parse_with_name("~!").is_err());
        // A prefix is never followed by space or another prefix
        assert!(matches!(Sense::parse_with_name("~ !x"), Err(Error::ParseError(_))));
        assert!(matches!(Sense::parse_with_name("~! xen"), Err(Error::ParseError(_))));
        assert!(matches!(Sense::parse_with_name("!~x"), Err(Error::ParseError(_))));
        assert!(matches!(Sense::parse_with_name("ssl debug"), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_score_table_spot_checks() {
        assert_eq!(Sense::score(Sense::Required, Sense::Required), Some(2));
        assert_eq!(Sense::score(Sense::Disallowed, Sense::Disallowed), Some(2));
        assert_eq!(Sense::score(Sense::Required, Sense::Disallowed), None);
        assert_eq!(Sense::score(Sense::Preferred, Sense::PreferNot), Some(-1));
        assert_eq!(Sense::score(Sense::Unspecified, Sense::Required), None);
        assert_eq!(Sense::score(Sense::PreferNot, Sense::Required), Some(-2));
    }

    #[test]
    fn test_diagonal_is_column_maximum() {
        for required in &ALL[1..] {
            let best = ALL
                .iter()
                .filter_map(|provided| Sense::score(*provided, *required))
                .max()
                .unwrap();
            assert_eq!(Sense::score(*required, *required), Some(best));
        }
    }

    #[test]
    fn test_merge_normal_strong_dominates() {
        let merged = Sense::merge("ssl", Sense::Preferred, Sense::Required, MergeType::Normal).unwrap();
        assert_eq!(merged, Some(Sense::Required));
        let merged = Sense::merge("ssl", Sense::Disallowed, Sense::Preferred, MergeType::Normal).unwrap();
        assert_eq!(merged, Some(Sense::Disallowed));
    }

    #[test]
    fn test_merge_normal_conflict_names_both_flags() {
        let err = Sense::merge("foo", Sense::Disallowed, Sense::Required, MergeType::Normal).unwrap_err();
        match err {
            Error::FlagConflict { first, second } => {
                assert_eq!(first, "!foo");
                assert_eq!(second, "foo");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(Sense::merge("foo", Sense::Preferred, Sense::PreferNot, MergeType::Normal).is_err());
    }

    #[test]
    fn test_merge_drop_conflicts() {
        let merged =
            Sense::merge("foo", Sense::Required, Sense::Disallowed, MergeType::DropConflicts).unwrap();
        assert_eq!(merged, None);
    }

    #[test]
    fn test_merge_override_and_prefs() {
        assert_eq!(
            Sense::merge("foo", Sense::Required, Sense::PreferNot, MergeType::Override).unwrap(),
            Some(Sense::PreferNot)
        );
        assert_eq!(
            Sense::merge("foo", Sense::Disallowed, Sense::PreferNot, MergeType::Prefs).unwrap(),
            Some(Sense::Disallowed)
        );
        assert_eq!(
            Sense::merge("foo", Sense::Required, Sense::PreferNot, MergeType::Prefs).unwrap(),
            Some(Sense::PreferNot)
        );
    }
}
