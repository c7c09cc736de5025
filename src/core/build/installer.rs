//! Dependency installer boundary.
//!
//! The builder never resolves packages itself. It hands the manifest, the
//! target and a destination directory to an [`Installer`], which must only
//! use prebuilt binary distributions for the target.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::core::constants::INSTALLER_CANDIDATES;
use crate::core::domain::Target;
use crate::error::{BuildError, Result};

/// Lines of installer stderr kept in a resolution error.
const STDERR_TAIL_LINES: usize = 20;

/// One installation into the Build Workspace.
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    pub manifest: &'a Path,
    pub target: &'a Target,
    pub destination: &'a Path,
}

/// Dependency installer trait.
pub trait Installer {
    /// Installer name for display.
    fn name(&self) -> &str;

    /// Install every requirement in the manifest into the destination.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::DependencyResolution` if any requirement cannot be
    /// satisfied by a binary distribution for the target.
    fn install(&self, request: &InstallRequest<'_>) -> Result<()>;
}

/// Runs `pip install` in cross-platform, binary-only mode.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    program: PathBuf,
    args: Vec<String>,
}

impl PipInstaller {
    /// Use an explicit argv prefix such as `["python3", "-m", "pip"]`.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InstallerNotFound` if the program is not on `PATH`.
    pub fn new(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| BuildError::InstallerNotFound("empty installer command".to_string()))?;

        let resolved = which::which(program)
            .map_err(|e| BuildError::InstallerNotFound(format!("{}: {}", program, e)))?;

        Ok(Self {
            program: resolved,
            args: args.to_vec(),
        })
    }

    /// Find `pip3` or `pip` on `PATH`.
    pub fn detect() -> Result<Self> {
        for candidate in INSTALLER_CANDIDATES {
            if let Ok(program) = which::which(candidate) {
                debug!(program = %program.display(), "found installer");
                return Ok(Self {
                    program,
                    args: Vec::new(),
                });
            }
        }

        Err(BuildError::InstallerNotFound(format!(
            "none of {} found on PATH; set build.installer",
            INSTALLER_CANDIDATES.join(", ")
        ))
        .into())
    }

    /// Configured installer, or the detected one.
    pub fn from_config(argv: Option<&[String]>) -> Result<Self> {
        match argv {
            Some(argv) => Self::new(argv),
            None => Self::detect(),
        }
    }

    /// The full command for a request.
    pub fn command(&self, request: &InstallRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("install")
            .arg("--requirement")
            .arg(request.manifest)
            .arg("--target")
            .arg(request.destination)
            .args(["--platform", request.target.platform.as_str()])
            .args(["--python-version", request.target.runtime_version.as_str()])
            .args(["--implementation", "cp"])
            .arg("--only-binary=:all:")
            .arg("--no-compile")
            .arg("--disable-pip-version-check")
            .arg("--quiet");
        cmd
    }
}

impl Installer for PipInstaller {
    fn name(&self) -> &str {
        "pip"
    }

    fn install(&self, request: &InstallRequest<'_>) -> Result<()> {
        info!(
            manifest = %request.manifest.display(),
            target = %request.target,
            "installing dependencies"
        );

        let output = self
            .command(request)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BuildError::InstallerNotFound(format!("{}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(STDERR_TAIL_LINES).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();

            return Err(BuildError::DependencyResolution {
                reason: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    tail.join("\n").trim()
                ),
                exit_code: output.status.code(),
            }
            .into());
        }

        debug!("installer finished");
        Ok(())
    }
}
