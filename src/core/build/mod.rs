//! Artifact Builder.
//!
//! A build is a fixed sequence of independently callable steps:
//!
//! 1. [`reset`] removes the previous workspace and archive
//! 2. [`Workspace::create`] materializes an empty workspace
//! 3. [`install_dependencies`] installs and verifies third-party packages
//! 4. [`overlay`] copies first-party code into the workspace root
//! 5. [`archive`] zips the workspace
//! 6. the workspace is removed on every exit path
//!
//! [`build`] runs them in order.

pub mod archive;
pub mod installer;
pub mod manifest;
pub mod overlay;
pub mod wheel;
pub mod workspace;

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::domain::{ArtifactHandle, Target};
use crate::error::{BuildError, Result, ValidationError};

pub use archive::archive;
pub use installer::{InstallRequest, Installer, PipInstaller};
pub use manifest::{Manifest, Requirement};
pub use overlay::overlay;
pub use wheel::InstalledDist;
pub use workspace::Workspace;

/// Resolved inputs of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// Directory first-party paths are relative to.
    pub source_root: PathBuf,
    pub manifest: PathBuf,
    pub first_party: Vec<PathBuf>,
    pub target: Target,
    pub workspace: PathBuf,
    pub output: PathBuf,
}

impl BuildSpec {
    /// Check every input before anything on disk is touched.
    pub fn validate(&self) -> Result<()> {
        if !self.manifest.is_file() {
            return Err(invalid(&self.manifest, "manifest does not exist or is not a file"));
        }
        if self.first_party.is_empty() {
            return Err(invalid(&self.source_root, "no first-party paths to include"));
        }
        if self.target.platform.trim().is_empty() {
            return Err(ValidationError::InvalidTarget("platform is empty".to_string()).into());
        }
        if self.target.version().is_none() {
            return Err(ValidationError::InvalidTarget(format!(
                "runtime version '{}' is not major.minor",
                self.target.runtime_version
            ))
            .into());
        }

        let source_root = normalize(&self.source_root);
        let workspace = normalize(&self.workspace);
        let output = normalize(&self.output);

        for entry in &self.first_party {
            let path = self.source_root.join(entry);
            if entry.is_absolute() || path.file_name().is_none() {
                return Err(invalid(entry, "must be a relative path naming a file or directory"));
            }
            if !path.exists() {
                return Err(invalid(&path, "first-party path does not exist"));
            }
            let normalized = normalize(&path);
            if workspace.starts_with(&normalized) {
                return Err(invalid(&self.workspace, "workspace is inside a first-party path"));
            }
            if normalized.starts_with(&workspace) {
                return Err(invalid(&path, "first-party path is inside the workspace"));
            }
        }

        if normalize(&self.manifest).starts_with(&workspace) {
            return Err(invalid(&self.manifest, "manifest is inside the workspace"));
        }
        if source_root.starts_with(&workspace) {
            return Err(invalid(&self.workspace, "workspace contains the source root"));
        }
        if output.starts_with(&workspace) {
            return Err(invalid(&self.output, "output is inside the workspace"));
        }
        if output.file_name().is_none() {
            return Err(invalid(&self.output, "output must name a file"));
        }

        Ok(())
    }
}

fn invalid(path: &Path, reason: &str) -> crate::error::Error {
    ValidationError::InvalidPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Remove the workspace and the archive left by any previous build.
pub fn reset(spec: &BuildSpec) -> Result<()> {
    match fs::symlink_metadata(&spec.workspace) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(&spec.workspace).map_err(BuildError::io("remove", &spec.workspace))?;
            debug!(path = %spec.workspace.display(), "removed stale workspace");
        }
        Ok(_) => {
            fs::remove_file(&spec.workspace).map_err(BuildError::io("remove", &spec.workspace))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(BuildError::io("stat", &spec.workspace)(e).into()),
    }

    remove_output(&spec.output)
}

fn remove_output(output: &Path) -> Result<()> {
    match fs::remove_file(output) {
        Ok(()) => {
            debug!(path = %output.display(), "removed stale archive");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuildError::io("remove", output)(e).into()),
    }
}

/// Install the manifest into `destination` and verify the result.
///
/// Every installed distribution must be built for `target` and every declared
/// requirement without an environment marker must have been installed.
/// Requirements behind a marker may be legitimately skipped by the installer.
pub fn install_dependencies(
    installer: &dyn Installer,
    manifest: &Manifest,
    target: &Target,
    destination: &Path,
) -> Result<Vec<InstalledDist>> {
    if manifest.is_empty() {
        debug!(manifest = %manifest.path().display(), "no requirements declared");
        return Ok(Vec::new());
    }

    debug!(
        installer = installer.name(),
        requirements = manifest.requirements().len(),
        includes = manifest.includes().len(),
        "resolving requirements"
    );
    installer.install(&InstallRequest {
        manifest: manifest.path(),
        target,
        destination,
    })?;

    let dists = wheel::installed(destination)?;
    wheel::verify(&dists, target)?;

    let missing: Vec<&str> = manifest
        .requirements()
        .iter()
        .filter(|r| r.marker.is_none())
        .filter(|r| !dists.iter().any(|d| d.name == r.name))
        .map(|r| r.spec.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(BuildError::DependencyResolution {
            reason: format!("not installed: {}", missing.join(", ")),
            exit_code: None,
        }
        .into());
    }

    Ok(dists)
}

/// Run a complete build.
///
/// On failure the workspace and any partial archive are removed and the
/// originating error is returned.
pub fn build(spec: &BuildSpec, installer: &dyn Installer) -> Result<ArtifactHandle> {
    spec.validate()?;
    let manifest = Manifest::load(&spec.manifest)?;

    reset(spec)?;
    let workspace = Workspace::create(&spec.workspace)?;

    match populate(spec, &manifest, installer, &workspace) {
        Ok(handle) => finish(workspace.remove(), handle, &spec.output),
        Err(e) => {
            drop(workspace);
            discard_output(&spec.output);
            Err(e)
        }
    }
}

/// Settle a populated build on the outcome of its workspace removal.
///
/// An archive is only handed out once its workspace is gone.
fn finish(removed: Result<()>, handle: ArtifactHandle, output: &Path) -> Result<ArtifactHandle> {
    if let Err(e) = removed {
        discard_output(output);
        return Err(e);
    }
    info!(path = %handle.path().display(), entries = handle.entries(), "artifact built");
    Ok(handle)
}

/// Remove the archive of a failed build, keeping the original error.
fn discard_output(output: &Path) {
    if let Err(cleanup) = remove_output(output) {
        warn!(error = %cleanup, "failed to remove partial archive");
    }
}

fn populate(
    spec: &BuildSpec,
    manifest: &Manifest,
    installer: &dyn Installer,
    workspace: &Workspace,
) -> Result<ArtifactHandle> {
    install_dependencies(installer, manifest, &spec.target, workspace.path())?;

    let copied = overlay(&spec.source_root, &spec.first_party, workspace.path())?;
    debug!(files = copied, "first-party code copied");

    archive(workspace.path(), &spec.output)
}
