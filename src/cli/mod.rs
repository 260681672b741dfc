//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Tablemask using clap.

pub mod commands;

use crate::domain::TablemaskError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tablemask - masked PostgreSQL table copies
#[derive(Parser, Debug)]
#[command(name = "tablemask")]
#[command(version, about, long_about = None)]
#[command(author = "Tablemask Contributors")]
pub struct Cli {
    /// Path to configuration file (falls back to TABLEMASK_CONFIG, then ./tablemask.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TABLEMASK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the invocation asked for a dry run
    pub fn dry_run_requested(&self) -> bool {
        matches!(&self.command, Commands::Run(args) if args.dry_run)
    }

    /// Reports a failure that happened before any command ran, such as an
    /// unreadable configuration file, and returns the exit code
    pub fn reject_startup(&self, error: TablemaskError) -> i32 {
        commands::run::reject(error, self.dry_run_requested())
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy a table from the source to the target, masking columns per policy
    Run(commands::run::RunArgs),

    /// Parse and compile a policy file, then print its rules
    ValidatePolicy(commands::validate::ValidatePolicyArgs),
}
