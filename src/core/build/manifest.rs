//! Dependency manifest parsing.
//!
//! Reads a pip requirements file far enough to know which distributions it
//! declares. Version specifiers, markers and options are left to the
//! installer. Nested requirement files and editable installs are recorded
//! but not followed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BuildError, Result, ValidationError};

/// One declared requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Normalized distribution name.
    pub name: String,
    /// The requirement as written, without comments.
    pub spec: String,
    /// Environment marker after `;`, e.g. `sys_platform == "win32"`.
    pub marker: Option<String>,
}

/// A parsed requirements file.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    requirements: Vec<Requirement>,
    /// `-r` / `-e` lines, which declare packages the parser cannot name.
    includes: Vec<String>,
}

impl Manifest {
    /// Read and parse a requirements file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(BuildError::io("read", path))?;
        let manifest = Self::parse(path, &contents)?;

        debug!(
            path = %path.display(),
            requirements = manifest.requirements.len(),
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Parse requirements text. `path` is used for error messages.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let mut requirements = Vec::new();
        let mut includes = Vec::new();
        let mut pending = String::new();
        let mut start_line = 0;

        for (idx, raw) in contents.lines().enumerate() {
            if pending.is_empty() {
                start_line = idx + 1;
            }

            let line = strip_comment(raw);
            if let Some(continued) = line.strip_suffix('\\') {
                pending.push_str(continued);
                pending.push(' ');
                continue;
            }
            pending.push_str(line);

            let entry = pending.trim().to_string();
            pending.clear();

            if entry.is_empty() {
                continue;
            }
            if entry.starts_with('-') {
                if is_include(&entry) {
                    includes.push(entry);
                }
                continue;
            }

            let name = distribution_name(&entry).ok_or_else(|| ValidationError::InvalidRequirement {
                path: path.to_path_buf(),
                line: start_line,
                reason: format!("no distribution name in '{}'", entry),
            })?;

            let marker = split_marker(&entry).map(str::to_string);
            requirements.push(Requirement {
                name: normalize_name(name),
                spec: entry,
                marker,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            requirements,
            includes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// True when the file declares nothing to install.
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty() && self.includes.is_empty()
    }
}

/// `-r file`, `--requirement=file`, `-e path` and `--editable path` pull in
/// packages. Constraint files and index options do not.
fn is_include(entry: &str) -> bool {
    if let Some(long) = entry.strip_prefix("--") {
        return long.starts_with("requirement") || long.starts_with("editable");
    }
    entry.starts_with("-r") || entry.starts_with("-e")
}

/// The environment marker of a requirement, if any.
///
/// For URL requirements the `;` must follow whitespace, as in
/// `pkg @ https://host/pkg.whl ; python_version >= "3.8"`.
fn split_marker(entry: &str) -> Option<&str> {
    let is_url = entry.contains('@');
    let bytes = entry.as_bytes();
    let at = bytes.iter().enumerate().position(|(i, b)| {
        *b == b';' && (!is_url || (i > 0 && bytes[i - 1].is_ascii_whitespace()))
    })?;

    let marker = entry[at + 1..].trim();
    (!marker.is_empty()).then_some(marker)
}

/// Drop a `#` comment. pip only treats `#` as a comment at line start or
/// after whitespace, so URL fragments survive.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return line[..i].trim_end();
        }
    }
    line.trim_end()
}

/// Leading distribution name of a requirement (`foo[extra]>=1.0` -> `foo`).
fn distribution_name(entry: &str) -> Option<&str> {
    let end = entry
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
        .unwrap_or(entry.len());
    let name = &entry[..end];

    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
        && name
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphanumeric());

    valid.then_some(name)
}

/// Normalize a distribution name: lowercase, with runs of `-`, `_` and `.`
/// collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }

    out
}
