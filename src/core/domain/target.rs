//! Target execution environment for binary dependencies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform tag and Python version the artifact must run on.
///
/// Independent of the host running the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Wheel platform tag, e.g. `manylinux2014_x86_64` or `linux_x86_64`.
    pub platform: String,
    /// Python `major.minor`, e.g. `3.12`.
    pub runtime_version: String,
}

impl Target {
    pub fn new(platform: impl Into<String>, runtime_version: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            runtime_version: runtime_version.into(),
        }
    }

    /// Parsed `(major, minor)` of the runtime version.
    pub fn version(&self) -> Option<(u32, u32)> {
        let mut parts = self.runtime_version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((major, minor))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / python {}", self.platform, self.runtime_version)
    }
}
