//! Configuration loading and persistence.

use super::{Config, MAX_SECRET_LENGTH};
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "loading config");
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        // 1. Generator policy
        let generator = &self.generator;
        if generator.length == 0 {
            errors.push("Generator length must be greater than 0".to_string());
        }
        if generator.length > MAX_SECRET_LENGTH {
            errors.push(format!(
                "Generator length {} exceeds maximum of {}",
                generator.length, MAX_SECRET_LENGTH
            ));
        }
        if !(generator.use_upper
            || generator.use_lower
            || generator.use_digits
            || generator.use_symbols)
        {
            errors.push("Generator must enable at least one character class".to_string());
        }

        // 2. Storage
        if self.storage.timeout_ms == 0 {
            errors.push("Storage timeout_ms must be greater than 0".to_string());
        }

        // 3. Vault
        if self.vault.default_category.trim().is_empty() {
            errors.push("Default category must not be empty".to_string());
        }
        if self.vault.user.trim().is_empty() {
            errors.push("Vault user must not be empty".to_string());
        }

        // 4. Logging
        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            errors.push(format!("Unknown log level '{}'", self.logging.level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Load configuration from the default path, falling back to defaults if no file exists.
    ///
    /// Environment overrides are applied on top either way.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let mut config = match Self::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Honor `VAULTKEEP_TIMEOUT_MS` and `VAULTKEEP_LOG_JSON`.
    pub fn apply_env_overrides(&mut self) {
        if let Some(timeout) = env::get_u64(vars::VAULTKEEP_TIMEOUT_MS) {
            self.storage.timeout_ms = timeout;
        }
        if env::get_bool(vars::VAULTKEEP_LOG_JSON) {
            self.logging.json = true;
        }
    }

    /// Persistence timeout as a [`Duration`].
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.timeout_ms)
    }

    /// Resolved directory for the file-backed store.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::vault_dir(),
        }
    }
}
