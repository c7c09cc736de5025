//! Constants used throughout ferry.
//!
//! Centralizes magic strings and default configuration values.

/// Default configuration file name.
pub const CONFIG_FILE: &str = "ferry.toml";

/// Default location of the local file store, relative to the config file.
pub const FILE_STORE_PATH: &str = ".ferry/secrets.json";

/// Reserved tag holding the fingerprint of the generation inputs.
pub const GENERATION_TAG: &str = "ferry:generation";

/// Prefix reserved for tags managed by ferry itself.
pub const RESERVED_TAG_PREFIX: &str = "ferry:";

/// Special characters allowed in generated tokens unless overridden.
pub const DEFAULT_SPECIAL: &str = "!#$%&*()-_=+[]{}<>:?";

/// Generated token length unless overridden.
pub const DEFAULT_LENGTH: usize = 32;

/// Upper bound on generated token length.
pub const MAX_LENGTH: usize = 4096;

/// Recovery window applied on teardown unless overridden.
pub const DEFAULT_RECOVERY_WINDOW_DAYS: u32 = 30;

/// Secret name length limit.
pub const MAX_NAME_LEN: usize = 512;

/// Secret description length limit.
pub const MAX_DESCRIPTION_LEN: usize = 2048;

/// Tag key length limit.
pub const MAX_TAG_KEY_LEN: usize = 128;

/// Tag value length limit.
pub const MAX_TAG_VALUE_LEN: usize = 256;

/// Default dependency manifest, relative to the source root.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Default Build Workspace directory, relative to the source root.
pub const DEFAULT_WORKSPACE: &str = "package";

/// Default artifact path, relative to the source root.
pub const DEFAULT_OUTPUT: &str = "lambda.zip";

/// Default target platform tag.
pub const DEFAULT_PLATFORM: &str = "manylinux2014_x86_64";

/// Default target Python runtime version.
pub const DEFAULT_RUNTIME_VERSION: &str = "3.12";

/// Installer executables searched on `PATH`, in order.
pub const INSTALLER_CANDIDATES: &[&str] = &["pip3", "pip"];
