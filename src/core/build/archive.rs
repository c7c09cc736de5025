//! Deterministic zip archiving of the workspace.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, trace};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::core::domain::ArtifactHandle;
use crate::error::{BuildError, Result, ValidationError};

/// Zip the contents of `workspace` into `output`.
///
/// Entry names are relative to the workspace root, so the root itself is not
/// an entry. Entries are sorted by name and carry a fixed timestamp, which
/// makes the archive a pure function of the tree it was built from.
pub fn archive(workspace: &Path, output: &Path) -> Result<ArtifactHandle> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(BuildError::io("create", parent))?;
    }

    let file = File::create(output).map_err(BuildError::io("create", output))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let base = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut entries = 0;
    for entry in WalkDir::new(workspace)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| BuildError::Io {
            action: "read",
            path: e.path().unwrap_or(workspace).to_path_buf(),
            source: e.into(),
        })?;
        let name = entry_name(workspace, entry.path())?;

        if entry.file_type().is_dir() {
            trace!(entry = %name, "add directory");
            zip.add_directory(format!("{name}/"), base.unix_permissions(0o755))
                .map_err(BuildError::Archive)?;
        } else {
            trace!(entry = %name, "add file");
            zip.start_file(name, base.unix_permissions(mode(entry.path())))
                .map_err(BuildError::Archive)?;
            let mut src = File::open(entry.path()).map_err(BuildError::io("read", entry.path()))?;
            io::copy(&mut src, &mut zip).map_err(BuildError::io("write", output))?;
        }
        entries += 1;
    }

    zip.finish().map_err(BuildError::Archive)?;

    let bytes = fs::read(output).map_err(BuildError::io("read", output))?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));
    debug!(path = %output.display(), entries, size = bytes.len(), "archive written");

    Ok(ArtifactHandle::new(
        output.to_path_buf(),
        bytes.len() as u64,
        entries,
        sha256,
    ))
}

/// `/`-joined path of `path` relative to `root`.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| ValidationError::InvalidPath {
            path: path.to_path_buf(),
            reason: "is outside the workspace".to_string(),
        })?;

    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn mode(_path: &Path) -> u32 {
    0o644
}
