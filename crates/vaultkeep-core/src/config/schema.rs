//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Longest secret the generator will produce.
pub const MAX_SECRET_LENGTH: usize = 4096;

/// Category assigned to records created without one.
pub const DEFAULT_CATEGORY: &str = "Personal";

/// Main Vaultkeep configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Password generator defaults.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Vault behaviour.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default policy for generated secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_length")]
    pub length: usize,

    #[serde(default = "default_true")]
    pub use_upper: bool,

    #[serde(default = "default_true")]
    pub use_lower: bool,

    #[serde(default = "default_true")]
    pub use_digits: bool,

    #[serde(default = "default_true")]
    pub use_symbols: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            use_upper: true,
            use_lower: true,
            use_digits: true,
            use_symbols: true,
        }
    }
}

/// Persistence collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the file-backed store. Defaults to `~/.vaultkeep/vault`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Timeout applied to every persistence call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Vault behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Category used when a new record does not name one.
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Local user identifier for single-user installs.
    #[serde(default = "default_user")]
    pub user: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            user: default_user(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted log lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_length() -> usize {
    16
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_user() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
