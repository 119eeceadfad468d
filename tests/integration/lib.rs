//! Shared fixtures for the vaultkeep integration tests.

use std::path::Path;
use std::sync::Arc;

use vaultkeep_core::Config;
use vaultkeep_secrets::{CredentialStore, FilePersistence, StaticIdentity};

/// Open a file-backed store rooted at `dir` for `user`, without loading it.
pub fn file_store(dir: &Path, user: &str) -> CredentialStore {
    let persistence = Arc::new(FilePersistence::new(dir));
    let identity = Arc::new(StaticIdentity::new(user));
    CredentialStore::from_config(persistence, identity, &Config::default())
}
