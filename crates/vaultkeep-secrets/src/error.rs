//! Error types for the credential engine.

use thiserror::Error;

/// Errors surfaced by generation, encryption, and the credential store.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Invalid generation policy: {0}")]
    InvalidPolicy(String),

    /// Integrity check failed: wrong key, tampered or truncated ciphertext.
    #[error("Authentication failed: ciphertext could not be verified")]
    AuthenticationFailure,

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("No valid session")]
    Unauthenticated,

    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("Invalid master key: {0}")]
    InvalidKey(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Credential not found: {0}")]
    NotFound(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Errors reported by a persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record already exists: {0}")]
    Conflict(String),

    #[error("invalid user id: {0}")]
    InvalidUser(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PersistenceError> for VaultError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(id) => VaultError::NotFound(id),
            other => VaultError::PersistenceUnavailable(other.to_string()),
        }
    }
}

/// Convenience result alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_not_found_maps_to_not_found() {
        let err: VaultError = PersistenceError::NotFound("abc".to_string()).into();
        assert!(matches!(err, VaultError::NotFound(id) if id == "abc"));
    }

    #[test]
    fn test_other_persistence_errors_map_to_unavailable() {
        let err: VaultError = PersistenceError::Conflict("abc".to_string()).into();
        assert!(matches!(err, VaultError::PersistenceUnavailable(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: VaultError = PersistenceError::from(io).into();
        match err {
            VaultError::PersistenceUnavailable(msg) => assert!(msg.contains("denied")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
