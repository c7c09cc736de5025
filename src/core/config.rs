//! Configuration file management.
//!
//! Handles reading, validating and scaffolding `ferry.toml`. The parsed
//! [`Config`] is the only source of store and build settings; nothing is
//! read from ambient cloud-provider state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::build::BuildSpec;
use crate::core::constants;
use crate::core::domain::{GenerationSpec, Target};
use crate::core::provision::ProvisionRequest;
use crate::core::types::{SecretName, Tags};
use crate::error::{ConfigError, Result};

/// Starter configuration written by `ferry init`.
pub const TEMPLATE: &str = r#"# ferry configuration

[store]
# "file" keeps a local JSON ledger; "aws" uses AWS Secrets Manager
# (requires a build with the `aws` feature).
backend = "file"
path = ".ferry/secrets.json"
# backend = "aws"
# region = "us-east-1"
# profile = "deploy"

[secret]
name = "ingestion/api-token"
description = "API token for the ingestion service"
# Days a deleted secret stays recoverable; 0 purges immediately.
recovery_window_days = 0
length = 32
special = "!#$%&*()-_=+[]{}<>:?"

[secret.tags]
service = "ingestion"

[build]
source_root = "."
manifest = "requirements.txt"
include = ["index.py", "events", "services", "utils"]
platform = "manylinux2014_x86_64"
runtime_version = "3.12"
workspace = "package"
output = "lambda.zip"
# installer = ["python3", "-m", "pip"]
"#;

/// Project configuration stored in `ferry.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Secret store connection
    #[serde(default)]
    pub store: StoreConfig,
    /// Secret to provision
    #[serde(default)]
    pub secret: Option<SecretConfig>,
    /// Artifact to build
    #[serde(default)]
    pub build: Option<BuildConfig>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Secret store selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Local JSON ledger.
    File {
        #[serde(default = "default_store_path")]
        path: PathBuf,
    },
    /// AWS Secrets Manager.
    Aws {
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        profile: Option<String>,
        #[serde(default)]
        endpoint_url: Option<String>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: default_store_path(),
        }
    }
}

/// The `[secret]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretConfig {
    pub name: SecretName,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_recovery_window")]
    pub recovery_window_days: u32,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_special")]
    pub special: String,
}

impl SecretConfig {
    /// Generation inputs for the token.
    pub fn generation(&self) -> GenerationSpec {
        GenerationSpec::new(self.length, self.special.clone())
    }

    /// Provisioning request for this secret.
    pub fn request(&self) -> ProvisionRequest {
        ProvisionRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            recovery_window_days: self.recovery_window_days,
            tags: self.tags.clone(),
            generation: self.generation(),
        }
    }
}

/// The `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Relative to the config file's directory; every other path is relative to this
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    /// First-party files and directories copied into the artifact root
    #[serde(default)]
    pub include: Vec<PathBuf>,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default = "default_runtime_version")]
    pub runtime_version: String,
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Installer argv prefix, e.g. `["python3", "-m", "pip"]`
    #[serde(default)]
    pub installer: Option<Vec<String>>,
}

impl BuildConfig {
    /// Build inputs with every path resolved against `base_dir`.
    ///
    /// The manifest, workspace and output resolve against the source root;
    /// the source root resolves against `base_dir`.
    pub fn spec(&self, base_dir: &Path) -> BuildSpec {
        let source_root = base_dir.join(&self.source_root);
        BuildSpec {
            manifest: source_root.join(&self.manifest),
            first_party: self.include.clone(),
            target: Target::new(self.platform.clone(), self.runtime_version.clone()),
            workspace: source_root.join(&self.workspace),
            output: source_root.join(&self.output),
            source_root,
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(constants::FILE_STORE_PATH)
}

fn default_recovery_window() -> u32 {
    constants::DEFAULT_RECOVERY_WINDOW_DAYS
}

fn default_length() -> usize {
    constants::DEFAULT_LENGTH
}

fn default_special() -> String {
    constants::DEFAULT_SPECIAL.to_string()
}

fn default_source_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_manifest() -> PathBuf {
    PathBuf::from(constants::DEFAULT_MANIFEST)
}

fn default_platform() -> String {
    constants::DEFAULT_PLATFORM.to_string()
}

fn default_runtime_version() -> String {
    constants::DEFAULT_RUNTIME_VERSION.to_string()
}

fn default_workspace() -> PathBuf {
    PathBuf::from(constants::DEFAULT_WORKSPACE)
}

fn default_output() -> PathBuf {
    PathBuf::from(constants::DEFAULT_OUTPUT)
}

impl Config {
    /// Default config path in the current directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Load and validate configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if the TOML is malformed, or a validation error.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let base_dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let config = Self::parse(&contents, base_dir)?;

        debug!(
            store = ?config.store,
            secret = config.secret.is_some(),
            build = config.build.is_some(),
            "config loaded"
        );

        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(contents: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    /// Write the starter template to `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AlreadyExists` unless `force` is set.
    pub fn write_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()).into());
        }
        std::fs::write(path, TEMPLATE)?;
        Ok(())
    }

    /// Directory relative paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The `[secret]` section.
    pub fn secret(&self) -> Result<&SecretConfig> {
        self.secret
            .as_ref()
            .ok_or_else(|| ConfigError::MissingSection("secret").into())
    }

    /// The `[build]` section.
    pub fn build(&self) -> Result<&BuildConfig> {
        self.build
            .as_ref()
            .ok_or_else(|| ConfigError::MissingSection("build").into())
    }

    /// Validate the configuration structure.
    ///
    /// Checks only what the file itself can get wrong. Secret names, tags and
    /// generation inputs are validated by the provisioner.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` on validation failure.
    pub fn validate(&self) -> Result<()> {
        debug!("validating config");

        if let Some(build) = &self.build {
            if build.include.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "build.include",
                    reason: "list at least one first-party file or directory".to_string(),
                }
                .into());
            }

            if build.platform.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "build.platform",
                    reason: "cannot be empty".to_string(),
                }
                .into());
            }

            if Target::new(build.platform.clone(), build.runtime_version.clone())
                .version()
                .is_none()
            {
                return Err(ConfigError::InvalidValue {
                    field: "build.runtime_version",
                    reason: format!("expected major.minor, got '{}'", build.runtime_version),
                }
                .into());
            }

            if let Some(installer) = &build.installer {
                if installer.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "build.installer",
                        reason: "cannot be an empty list".to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}
