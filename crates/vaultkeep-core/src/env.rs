//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Get an environment variable as a u64 (e.g., for timeouts).
pub fn get_u64(name: &str) -> Option<u64> {
    get_var(name).and_then(|v| v.trim().parse().ok())
}

/// Environment variable names recognised by Vaultkeep.
pub mod vars {
    /// Vaultkeep home directory override.
    pub const VAULTKEEP_HOME: &str = "VAULTKEEP_HOME";

    /// Config file override.
    pub const VAULTKEEP_CONFIG: &str = "VAULTKEEP_CONFIG";

    /// Log filter directive (tracing `EnvFilter` syntax).
    pub const VAULTKEEP_LOG: &str = "VAULTKEEP_LOG";

    /// Emit logs as JSON.
    pub const VAULTKEEP_LOG_JSON: &str = "VAULTKEEP_LOG_JSON";

    /// Hex-encoded master key for the current session.
    pub const VAULTKEEP_MASTER_KEY: &str = "VAULTKEEP_MASTER_KEY";

    /// Persistence timeout override in milliseconds.
    pub const VAULTKEEP_TIMEOUT_MS: &str = "VAULTKEEP_TIMEOUT_MS";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bool() {
        env::set_var("VAULTKEEP_TEST_BOOL_TRUE", "true");
        env::set_var("VAULTKEEP_TEST_BOOL_ON", "ON");
        env::set_var("VAULTKEEP_TEST_BOOL_FALSE", "0");

        assert!(get_bool("VAULTKEEP_TEST_BOOL_TRUE"));
        assert!(get_bool("VAULTKEEP_TEST_BOOL_ON"));
        assert!(!get_bool("VAULTKEEP_TEST_BOOL_FALSE"));
        assert!(!get_bool("VAULTKEEP_TEST_BOOL_UNSET"));
    }

    #[test]
    fn test_get_var_empty_is_none() {
        env::set_var("VAULTKEEP_TEST_EMPTY", "");
        assert_eq!(get_var("VAULTKEEP_TEST_EMPTY"), None);
    }

    #[test]
    fn test_get_u64() {
        env::set_var("VAULTKEEP_TEST_U64", " 2500 ");
        env::set_var("VAULTKEEP_TEST_U64_BAD", "soon");
        assert_eq!(get_u64("VAULTKEEP_TEST_U64"), Some(2500));
        assert_eq!(get_u64("VAULTKEEP_TEST_U64_BAD"), None);
    }
}
