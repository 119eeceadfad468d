//! # vaultkeep-core
//!
//! Core types, configuration, and utilities for Vaultkeep.
//!
//! This crate provides shared functionality used across the Vaultkeep crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the JSON5 config file
//! - **Types**: Strongly-typed user and credential identifiers
//! - **Secrets**: A zeroizing, redacted string for plaintext secret material
//! - **Utilities**: Path resolution and environment handling

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use secret::SecretString;
pub use types::{CredentialId, UserId};
