// src/dependencies/mod.rs

//! Dependency and flavor model
//!
//! This module provides the value types behind requires, provides and
//! flavors, in the style of OG Conary's dependency classes:
//! - `Dependency` - a name plus flags, each flag carrying a `Sense`
//! - `DependencyClass` - all dependencies of one `ClassTag` (soname, trove, ...)
//! - `DependencySet` - classes keyed by tag
//!
//! Sets score against each other with a fixed table of sense pairs, merge
//! under a chosen `MergeType`, and freeze to a compact text form.
//!
//! # Example
//!
//! ```ignore
//! use conary_deps::dependencies::{parse_dep_set, DependencySet};
//!
//! let provides = parse_dep_set(["soname: ELF64/libssl.so.3(SysV x86_64)"]).unwrap();
//! let requires = parse_dep_set(["soname: ELF64/libssl.so.3(SysV)"]).unwrap();
//! assert!(provides.satisfies(&requires));
//!
//! let frozen = provides.freeze();
//! assert_eq!(DependencySet::thaw(&frozen).unwrap(), provides);
//! ```

mod classes;
mod dependency;
mod freeze;
mod parse;
mod sense;
mod set;

pub use classes::{ClassTag, DependencyClass};
pub use dependency::Dependency;
pub use freeze::{DependencyCache, EMPTY_FROZEN};
pub use parse::{parse_dep, parse_dep_set};
pub use sense::{MergeType, Sense};
pub use set::DependencySet;
