//! Path resolution utilities.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Vaultkeep base directory (`$VAULTKEEP_HOME` or `~/.vaultkeep`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(vars::VAULTKEEP_HOME) {
        return Ok(PathBuf::from(home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".vaultkeep"))
}

/// Get the main config file path (`$VAULTKEEP_CONFIG` or `~/.vaultkeep/vaultkeep.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_var(vars::VAULTKEEP_CONFIG) {
        return Ok(PathBuf::from(path));
    }
    Ok(base_dir()?.join("vaultkeep.json5"))
}

/// Get the default directory for file-backed vault data (`~/.vaultkeep/vault`).
pub fn vault_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("vault"))
}
