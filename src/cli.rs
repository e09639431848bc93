// src/cli.rs
//! CLI definitions for conary-deps
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "conary-deps")]
#[command(author = "Conary Project")]
#[command(version)]
#[command(about = "Dependency closure checking and job ordering for trove changesets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init {
        /// Path to the database file
        #[arg(short, long, default_value = "/var/lib/conary/conary.db")]
        db_path: String,
    },

    /// Record installed troves from a TOML manifest
    Import {
        /// Path to the trove manifest
        manifest: String,

        /// Path to the database file
        #[arg(short, long, default_value = "/var/lib/conary/conary.db")]
        db_path: String,
    },

    /// List installed troves
    List {
        /// Only show troves with this name
        pattern: Option<String>,

        /// Show requires and provides too
        #[arg(short, long)]
        verbose: bool,

        /// Path to the database file
        #[arg(short, long, default_value = "/var/lib/conary/conary.db")]
        db_path: String,
    },

    /// Check a changeset for dependency closure
    Check {
        /// Path to the changeset manifest
        changeset: String,

        /// Path to the database file
        #[arg(short, long, default_value = "/var/lib/conary/conary.db")]
        db_path: String,

        /// Also compute the job order
        #[arg(long)]
        order: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Trove manifest of extra troves to treat as installed
        #[arg(long)]
        assume: Option<String>,
    },

    /// Parse a flavor and print its display and frozen forms
    Flavor {
        /// Flavor text, e.g. "ssl,!debug is: x86_64"
        flavor: String,

        /// Base flavor supplying omitted axes ("system" for the running machine)
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Score a trove flavor against a system flavor
    Score {
        /// Flavor of the system
        system: String,

        /// Flavor the trove needs
        trove: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
