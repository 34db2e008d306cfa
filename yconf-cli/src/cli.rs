//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure of the demo binary using
//! clap's derive macros, including global options and subcommands.

use crate::commands::{CompletionsCommand, ConfigCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Manage the settings of the yconf demo mail fetcher.
#[derive(Parser)]
#[command(name = "yconf-demo")]
#[command(version, about = "Manage a schema-checked YAML configuration file", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the configuration file location
    #[arg(long, value_name = "PATH", global = true, env = "YCONF_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    #[command(flatten)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
