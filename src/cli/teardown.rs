//! Teardown command.

use crate::cli::output;
use crate::core::config::Config;
use crate::core::{provision, store};
use crate::error::Result;

/// Delete the configured secret, honoring its recovery window.
pub fn execute(config: &Config) -> Result<()> {
    let secret = config.secret()?;
    let store = store::open(&config.store, config.base_dir())?;

    let deleted = provision::teardown(store.as_ref(), &secret.name, secret.recovery_window_days)?;

    match (deleted, secret.recovery_window_days) {
        (false, _) => output::warn(&format!("nothing to delete for {}", secret.name)),
        (true, 0) => output::success(&format!("deleted {}", secret.name)),
        (true, days) => output::success(&format!(
            "scheduled {} for deletion in {} days",
            secret.name, days
        )),
    }
    Ok(())
}
