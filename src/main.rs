//! Ferry - provision deployment secrets and package serverless functions.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ferry::cli::output;
use ferry::cli::{execute, Cli};
use ferry::error::{ConfigError, Error, StoreError};

fn main() {
    let cli = Cli::parse();

    // Log to stderr; stdout carries command output only
    let filter = EnvFilter::try_from_env("FERRY_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("ferry=debug")
        } else {
            EnvFilter::new("ferry=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.config) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotFound(_)) => Some("run: ferry init".to_string()),
            Error::Config(ConfigError::MissingSection(section)) => {
                Some(format!("add a [{}] section to ferry.toml", section))
            }
            Error::Store(StoreError::Conflict { .. }) => {
                Some("wait for the purge, restore the secret, or choose another name".to_string())
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(&hint);
        }
        std::process::exit(e.exit_code());
    }
}
