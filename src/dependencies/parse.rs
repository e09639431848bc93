// src/dependencies/parse.rs

//! Human-readable dependency strings
//!
//! Format: `<class>: <name>[(<flag> <flag> ...)]`, for example
//! `soname: ELF64/libssl.so.3(SysV x86_64)` or `trove: openssl:lib`.

use super::classes::ClassTag;
use super::dependency::Dependency;
use super::sense::Sense;
use super::set::DependencySet;
use crate::error::{Error, Result};

/// Parse one dependency string into its class and value
pub fn parse_dep(s: &str) -> Result<(ClassTag, Dependency)> {
    let (tag_name, rest) = s
        .split_once(':')
        .ok_or_else(|| Error::ParseError(format!("Missing dependency class in '{}'", s)))?;

    let tag_name = tag_name.trim();
    let tag = ClassTag::from_name(tag_name)
        .ok_or_else(|| Error::ParseError(format!("Unknown dependency class '{}'", tag_name)))?;
    if tag.is_flavor_axis() {
        return Err(Error::InvalidDependency(format!(
            "'{}' dependencies are written as flavors, not as '{}'",
            tag, s
        )));
    }

    let rest = rest.trim();
    let (name, flags) = match (rest.rfind('('), rest.ends_with(')')) {
        (Some(open), true) => (&rest[..open], Some(&rest[open + 1..rest.len() - 1])),
        (None, false) => (rest, None),
        _ => {
            return Err(Error::ParseError(format!(
                "Unbalanced parentheses in dependency '{}'",
                s
            )));
        }
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::ParseError(format!("Missing dependency name in '{}'", s)));
    }
    if name.contains('|') {
        return Err(Error::ParseError(format!("'|' in dependency name '{}'", s)));
    }

    let mut parsed: Vec<(String, Sense)> = Vec::new();
    for flag in flags.unwrap_or_default().split_whitespace() {
        let (sense, flag) = Sense::parse_with_name(flag)?;
        parsed.push((flag.to_string(), sense));
    }

    Ok((tag, Dependency::with_flags(name, parsed)?))
}

/// Parse a list of dependency strings into one set
pub fn parse_dep_set<I, S>(deps: I) -> Result<DependencySet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = DependencySet::new();
    for dep in deps {
        let (tag, dep) = parse_dep(dep.as_ref())?;
        set.add_dep(tag, dep)?;
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trove_dep() {
        let (tag, dep) = parse_dep("trove: openssl:lib").unwrap();
        assert_eq!(tag, ClassTag::Trove);
        assert_eq!(dep.name(), "openssl:lib");
        assert!(!dep.has_flags());
    }

    #[test]
    fn test_parse_soname_with_flags() {
        let (tag, dep) = parse_dep("soname: ELF64/libc.so.6(GLIBC_2.34 SysV x86_64)").unwrap();
        assert_eq!(tag, ClassTag::Soname);
        assert_eq!(dep.name(), "ELF64/libc.so.6");
        assert_eq!(dep.flags().len(), 3);
        assert_eq!(dep.sense_of("SysV"), Sense::Required);
    }

    #[test]
    fn test_parse_display_round_trip() {
        let (tag, dep) = parse_dep("trove: foo:runtime(~!debug ssl)").unwrap();
        let text = format!("{}: {}", tag, dep);
        assert_eq!(text, "trove: foo:runtime(~!debug ssl)");
        assert_eq!(parse_dep(&text).unwrap(), (tag, dep));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_dep("openssl"), Err(Error::ParseError(_))));
        assert!(matches!(parse_dep("python: requests"), Err(Error::ParseError(_))));
        assert!(matches!(parse_dep("soname: libfoo.so(SysV"), Err(Error::ParseError(_))));
        assert!(matches!(parse_dep("trove: "), Err(Error::ParseError(_))));
        assert!(matches!(parse_dep("use: ssl"), Err(Error::InvalidDependency(_))));
        assert!(matches!(parse_dep("is: x86"), Err(Error::InvalidDependency(_))));
        assert!(matches!(parse_dep("file: /usr/lib/a|b"), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_parse_flags_are_space_separated() {
        assert!(matches!(
            parse_dep("soname: ELF64/libfoo.so(SysV,x86_64)"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(parse_dep("trove: foo(~ !debug)"), Err(Error::ParseError(_))));
        let (_, dep) = parse_dep("soname: ELF64/libfoo.so( SysV  x86_64 )").unwrap();
        assert_eq!(dep.flags().len(), 2);
    }

    #[test]
    fn test_parse_dep_set() {
        let set = parse_dep_set(["trove: foo:lib", "soname: ELF64/libfoo.so.1(SysV)", "file: /usr/bin/foo"])
            .unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.has_class(ClassTag::File));
    }
}
