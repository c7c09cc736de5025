//! Init command - write a starter config file.

use std::path::Path;

use tracing::info;

use crate::cli::output;
use crate::core::config::Config;
use crate::error::Result;

/// Write the starter `ferry.toml` to `path`.
pub fn execute(path: &Path, force: bool) -> Result<()> {
    Config::write_template(path, force)?;
    info!(path = %path.display(), "config written");

    output::success(&format!("wrote {}", output::path(path)));
    output::hint("edit [secret] and [build], then run: ferry provision");
    Ok(())
}
