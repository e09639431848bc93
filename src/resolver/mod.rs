// src/resolver/mod.rs

//! Changeset dependency checking and ordering
//!
//! This module checks that a proposed changeset leaves every requirement
//! satisfied and orders its jobs so providers land before their users.
//!
//! - `graph`: generic directed graph with DFS, ordering and SCCs
//! - `job`: the changeset operation record
//! - `index`: dependency lookups (in memory, layered)
//! - `engine`: the closure and ordering solver

mod conflict;
mod engine;
pub mod graph;
mod index;
mod job;
mod plan;

pub use conflict::{DependencyFailure, UnresolvableDependency};
pub use engine::{check_changeset, DependencyChecker};
pub use graph::{DfsResult, DirectedGraph};
pub use index::{provides_dependency, DependencyIndex, LayeredIndex, MemoryIndex, TroveDeps};
pub use job::{Changeset, TroveAdd, TroveJob, TroveSpec, VersionFlavor};
pub use plan::CheckResult;
