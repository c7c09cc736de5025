//! Ferry - provision deployment secrets and package serverless functions.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Write a starter ferry.toml
//! │   ├── provision     # Create or reuse the generated secret
//! │   ├── teardown      # Delete the secret
//! │   ├── build         # Build the deployment archive
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # ferry.toml management
//!     ├── domain/       # Secret, generation, target and artifact types
//!     ├── provision     # Idempotent secret provisioning
//!     ├── store/        # Secret store backends
//!     │   ├── mod       # SecretStore trait
//!     │   ├── ledger    # Versioned secret bookkeeping
//!     │   ├── fs        # Local JSON store
//!     │   ├── memory    # In-process store
//!     │   └── aws       # AWS Secrets Manager (feature "aws")
//!     └── build/        # Artifact Builder
//!         ├── manifest  # requirements.txt parsing
//!         ├── installer # Cross-platform pip install
//!         ├── wheel     # Installed wheel tag verification
//!         ├── workspace # Build Workspace guard
//!         ├── overlay   # First-party code copy
//!         └── archive   # Deterministic zip output
//! ```
//!
//! # Features
//!
//! - Generated secrets that stay stable until their generation inputs change
//! - Sensitive values redacted from every log and debug output
//! - Binary-only dependency installs for a target platform, not the host
//! - Reproducible zip archives with a clean workspace on every exit path

pub mod cli;
pub mod core;
pub mod error;
