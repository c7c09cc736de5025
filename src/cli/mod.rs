//! Command-line interface.

pub mod build;
pub mod completions;
pub mod init;
pub mod output;
pub mod provision;
pub mod teardown;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::core::config::Config;
use crate::error::Result;

/// Ferry - provision deployment secrets and package serverless functions.
#[derive(Parser)]
#[command(
    name = "ferry",
    about = "Provision deployment secrets and package serverless functions",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true, env = "FERRY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Write a starter ferry.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Create the configured secret, or reuse it if nothing changed
    Provision {
        /// Print only the raw secret value
        #[arg(long)]
        reveal: bool,
    },

    /// Delete the configured secret
    Teardown,

    /// Build the deployment archive
    Build,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(command: Command, config: Option<PathBuf>) -> Result<()> {
    use Command::*;

    let config_path = config.unwrap_or_else(Config::default_path);

    match command {
        Init { force } => init::execute(&config_path, force),
        Provision { reveal } => provision::execute(&load(&config_path)?, reveal),
        Teardown => teardown::execute(&load(&config_path)?),
        Build => build::execute(&load(&config_path)?),
        Completions { shell } => completions::execute(shell),
    }
}

fn load(path: &Path) -> Result<Config> {
    Config::load(path)
}
