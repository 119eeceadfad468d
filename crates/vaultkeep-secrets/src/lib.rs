//! Credential protection and retrieval for Vaultkeep.
//!
//! Secrets are generated from a CSPRNG, sealed with AES-256-GCM under a
//! caller-held master key, and kept in a session-scoped store that only ever
//! holds ciphertext. Queries run over the plaintext metadata; decryption
//! happens per call when the caller reveals a record.

pub mod crypto;
pub mod error;
pub mod generator;
pub mod identity;
pub mod persistence;
pub mod query;
pub mod random;
pub mod store;
pub mod types;

pub use crypto::MasterKey;
pub use error::{PersistenceError, Result, VaultError};
pub use generator::{GenerationPolicy, SecretGenerator};
pub use identity::{Identity, StaticIdentity};
pub use persistence::{FilePersistence, MemoryPersistence, Persistence};
pub use query::Query;
pub use random::{OsRandom, RandomSource};
pub use store::CredentialStore;
pub use types::{categories, CipherBlob, CredentialRecord, CredentialUpdate, NewCredential};
pub use vaultkeep_core::{CredentialId, SecretString, UserId};
