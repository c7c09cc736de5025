//! Provision command.

use tracing::info;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::{provision, store};
use crate::error::Result;

/// Provision the configured secret.
///
/// With `reveal`, stdout carries the raw value and nothing else.
pub fn execute(config: &Config, reveal: bool) -> Result<()> {
    let request = config.secret()?.request();
    let store = store::open(&config.store, config.base_dir())?;
    info!(backend = store.name(), secret = %request.name, "provisioning");

    let handle = provision::provision(store.as_ref(), &request)?;

    if reveal {
        println!("{}", handle.value.expose());
        return Ok(());
    }

    output::success(&format!("{} {}", handle.name, handle.outcome));
    output::kv("id:", &handle.id);
    output::kv("version:", &handle.version_id);
    output::kv("value:", &handle.value);
    Ok(())
}
