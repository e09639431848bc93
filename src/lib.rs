// src/lib.rs

//! Conary dependency checking
//!
//! Trove dependency model, flavors, and the changeset closure solver.
//!
//! # Architecture
//!
//! - Dependencies: name plus sensed flags, grouped into classes and sets
//! - Flavors: dependency sets over the `use` and `is` axes
//! - Solver: checks that a changeset leaves every requirement met and
//!   orders its jobs, collapsing dependency cycles into batches
//! - Database-first: installed troves and their dependencies live in SQLite

pub mod db;
pub mod dependencies;
mod error;
pub mod flavor;
pub mod manifest;
pub mod resolver;

pub use dependencies::{ClassTag, Dependency, DependencyClass, DependencySet, MergeType, Sense};
pub use error::{Error, Result};
pub use flavor::{parse_flavor, select_best};
pub use resolver::{check_changeset, Changeset, CheckResult, DependencyChecker, DependencyIndex, TroveSpec};
