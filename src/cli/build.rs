//! Build command.
//!
//! Prints the artifact path on stdout and nothing else.

use tracing::info;

use crate::core::build::{self, PipInstaller};
use crate::core::config::Config;
use crate::error::Result;

/// Build the deployment archive from the `[build]` section.
pub fn execute(config: &Config) -> Result<()> {
    let section = config.build()?;
    let spec = section.spec(config.base_dir());
    let installer = PipInstaller::from_config(section.installer.as_deref())?;

    let artifact = build::build(&spec, &installer)?;
    info!(
        size = artifact.size(),
        entries = artifact.entries(),
        sha256 = artifact.sha256(),
        "build complete"
    );

    println!("{}", artifact.path().display());
    Ok(())
}
