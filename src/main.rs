// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { db_path }) => commands::cmd_init(&db_path),
        Some(Commands::Import { manifest, db_path }) => commands::cmd_import(&manifest, &db_path),
        Some(Commands::List {
            pattern,
            verbose,
            db_path,
        }) => commands::cmd_list(pattern.as_deref(), verbose, &db_path),
        Some(Commands::Check {
            changeset,
            db_path,
            order,
            json,
            assume,
        }) => commands::cmd_check(&changeset, &db_path, order, json, assume.as_deref()),
        Some(Commands::Flavor { flavor, base }) => commands::cmd_flavor(&flavor, base.as_deref()),
        Some(Commands::Score { system, trove }) => commands::cmd_score(&system, &trove),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "conary-deps", &mut std::io::stdout());
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
