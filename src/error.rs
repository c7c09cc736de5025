//! Error types.
//!
//! Each subsystem has its own error enum; `Error` wraps them so callers can
//! propagate with `?` and still match on the originating kind.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for all ferry operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Installer failures keep the installer's own status so a calling
    /// pipeline sees the same code it would have seen running pip directly.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Build(BuildError::DependencyResolution {
                exit_code: Some(code),
                ..
            }) if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("config file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config has no [{0}] section")]
    MissingSection(&'static str),

    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("store backend '{0}' is not available in this build (enable the '{0}' feature)")]
    BackendUnavailable(&'static str),
}

/// Input validation errors, raised before any side effect.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("secret name cannot be empty")]
    EmptyName,

    #[error("invalid secret name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("description is {0} characters, the limit is 2048")]
    DescriptionTooLong(usize),

    #[error("invalid tag '{key}': {reason}")]
    InvalidTag { key: String, reason: String },

    #[error("invalid token length {length}: {reason}")]
    InvalidLength { length: usize, reason: String },

    #[error("invalid special character {ch:?}: {reason}")]
    InvalidSpecial { ch: char, reason: String },

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("invalid requirement on line {line} of {path}: {reason}")]
    InvalidRequirement {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path} collides with an existing {existing} in the workspace")]
    PathCollision {
        path: PathBuf,
        existing: &'static str,
    },
}

/// Secret store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret '{name}' is scheduled for deletion until {purge_at}")]
    Conflict { name: String, purge_at: String },

    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("secret already exists: {0}")]
    AlreadyExists(String),

    #[error("failed to read store {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write store {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store request failed: {0}")]
    Backend(String),
}

/// Artifact build errors.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("dependency resolution failed: {reason}")]
    DependencyResolution {
        reason: String,
        exit_code: Option<i32>,
    },

    #[error("{package} has no build for platform {platform} / python {runtime} (tags: {tags})")]
    PlatformMismatch {
        package: String,
        platform: String,
        runtime: String,
        tags: String,
    },

    #[error("installer not found: {0}")]
    InstallerNotFound(String),

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl BuildError {
    /// Wrap an io error with the action and path that produced it.
    ///
    /// Intended for `map_err(BuildError::io("remove", &path))`.
    pub fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| BuildError::Io {
            action,
            path,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
