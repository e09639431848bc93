// src/db/models/mod.rs

//! Data models for database entities
//!
//! Each struct corresponds to a table and provides methods for creating,
//! reading and deleting records.

mod dependency;
mod trove;

pub use dependency::{DepTable, DependencyEntry};
pub use trove::Trove;
