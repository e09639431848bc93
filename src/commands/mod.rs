// src/commands/mod.rs
//! Command handlers for the conary-deps CLI

mod check;
mod db;
mod flavor;

pub use check::cmd_check;
pub use db::{cmd_import, cmd_init, cmd_list};
pub use flavor::{cmd_flavor, cmd_score};
