//! Per-invocation vault session.
//!
//! The master key is resolved in priority order:
//! 1. `--key-file` (hex-encoded contents)
//! 2. `VAULTKEEP_MASTER_KEY` environment variable (hex-encoded)
//!
//! There is no fallback: without a key, commands that encrypt or decrypt
//! fail before touching the vault.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::debug;
use vaultkeep_core::env::{self, vars};
use vaultkeep_core::Config;
use vaultkeep_secrets::{CredentialStore, FilePersistence, MasterKey, StaticIdentity};
use zeroize::Zeroizing;

/// Resolve the master key for this invocation.
pub fn resolve_master_key(key_file: Option<&Path>) -> anyhow::Result<MasterKey> {
    if let Some(path) = key_file {
        debug!(path = %path.display(), "using master key from file");
        let contents = Zeroizing::new(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read key file {}", path.display()))?,
        );
        return MasterKey::from_hex(&contents).context("Key file does not hold a valid key");
    }

    if let Some(hex_key) = env::get_var(vars::VAULTKEEP_MASTER_KEY).map(Zeroizing::new) {
        debug!("using master key from environment variable");
        return MasterKey::from_hex(&hex_key)
            .with_context(|| format!("{} does not hold a valid key", vars::VAULTKEEP_MASTER_KEY));
    }

    anyhow::bail!(
        "No master key available: pass --key-file or set {} (create one with `vaultkeep keygen`)",
        vars::VAULTKEEP_MASTER_KEY
    )
}

/// Open the file-backed store for the configured user and load it.
pub async fn open_store(config: &Config) -> anyhow::Result<CredentialStore> {
    let data_dir = config.data_dir()?;
    debug!(dir = %data_dir.display(), user = %config.vault.user, "opening vault");

    let persistence = Arc::new(FilePersistence::new(data_dir));
    let identity = Arc::new(StaticIdentity::new(config.vault.user.as_str()));
    let store = CredentialStore::from_config(persistence, identity, config);
    store.load().await.context("Failed to load vault")?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_file_takes_priority() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("key.hex");
        let key = MasterKey::generate().unwrap();
        std::fs::write(&path, format!("{}\n", key.to_hex().expose_secret())).unwrap();

        let resolved = resolve_master_key(Some(&path)).unwrap();
        let blob = vaultkeep_secrets::crypto::encrypt("value", &key).unwrap();
        let opened = vaultkeep_secrets::crypto::decrypt(&blob, &resolved).unwrap();
        assert_eq!(opened.expose_secret(), "value");
    }

    #[test]
    fn test_bad_key_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("key.hex");
        std::fs::write(&path, "not-hex").unwrap();
        assert!(resolve_master_key(Some(&path)).is_err());
        assert!(resolve_master_key(Some(&tmp.path().join("missing"))).is_err());
    }

    #[tokio::test]
    async fn test_open_store_on_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = Some(tmp.path().join("vault"));
        let store = open_store(&config).await.unwrap();
        assert!(store.is_empty().await);
    }
}
