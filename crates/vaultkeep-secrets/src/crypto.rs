//! AES-256-GCM sealing of credential secrets with HKDF-SHA256 key derivation.
//!
//! Every call draws a fresh random salt and nonce. The master key is never
//! used directly as a cipher key: a per-blob key is derived from it and the
//! salt, then wiped once the call returns. A blob is self-contained:
//!
//! ```text
//! version (1) || salt (16) || nonce (12) || ciphertext || tag (16)
//! ```
//!
//! The version byte is authenticated as associated data.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use hkdf::Hkdf;
use sha2::Sha256;
use std::fmt;
use vaultkeep_core::SecretString;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, VaultError};
use crate::random;
use crate::types::CipherBlob;

const BLOB_VERSION: u8 = 1;
const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;
const KEY_SIZE: usize = 32;
const HEADER_SIZE: usize = 1 + SALT_SIZE + NONCE_SIZE;

/// Shortest master key accepted, in bytes.
pub const MIN_MASTER_KEY_LEN: usize = 16;

/// HKDF info string used to domain-separate derived keys.
const HKDF_INFO: &[u8] = b"vaultkeep-credential-v1";

/// Session-scoped key material supplied by the caller.
///
/// The engine only ever borrows it for the duration of a call. The bytes
/// are wiped when the owner drops it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Wrap raw key material (at least [`MIN_MASTER_KEY_LEN`] bytes).
    pub fn new(mut bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < MIN_MASTER_KEY_LEN {
            let len = bytes.len();
            bytes.zeroize();
            return Err(VaultError::InvalidKey(format!(
                "expected at least {MIN_MASTER_KEY_LEN} bytes, got {len}"
            )));
        }
        Ok(Self { bytes })
    }

    /// Parse hex-encoded key material.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| VaultError::InvalidKey(format!("invalid hex: {e}")))?;
        Self::new(bytes)
    }

    /// Generate a fresh random 256-bit key.
    pub fn generate() -> Result<Self> {
        let mut bytes = vec![0u8; KEY_SIZE];
        random::fill_bytes(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Hex encoding of the key, for handing to the user once at creation.
    pub fn to_hex(&self) -> SecretString {
        SecretString::new(hex::encode(&self.bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Derive the per-blob AES key from `master_key` and `salt`.
fn derive_key(master_key: &MasterKey, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), master_key.as_bytes());
    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    hk.expand(HKDF_INFO, &mut okm[..])
        .map_err(|e| VaultError::EncryptionFailed(format!("key derivation failed: {e}")))?;
    Ok(okm)
}

/// Seal `plaintext` under `key`.
pub fn encrypt(plaintext: &str, key: &MasterKey) -> Result<CipherBlob> {
    let mut header = [0u8; HEADER_SIZE];
    header[0] = BLOB_VERSION;
    random::fill_bytes(&mut header[1..])?;

    let (salt, nonce_bytes) = header[1..].split_at(SALT_SIZE);
    let derived = derive_key(key, salt)?;
    let cipher = Aes256Gcm::new_from_slice(&derived[..])
        .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;

    let sealed = cipher
        .encrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: plaintext.as_bytes(),
                aad: &header[..1],
            },
        )
        .map_err(|e| VaultError::EncryptionFailed(e.to_string()))?;

    let mut blob = Vec::with_capacity(HEADER_SIZE + sealed.len());
    blob.extend_from_slice(&header);
    blob.extend_from_slice(&sealed);
    Ok(CipherBlob::from_bytes(blob))
}

/// Open a blob produced by [`encrypt`].
///
/// Returns the verified plaintext or [`VaultError::AuthenticationFailure`];
/// nothing in between.
pub fn decrypt(blob: &CipherBlob, key: &MasterKey) -> Result<SecretString> {
    let bytes = blob.as_bytes();
    if bytes.len() < HEADER_SIZE + TAG_SIZE || bytes[0] != BLOB_VERSION {
        return Err(VaultError::AuthenticationFailure);
    }

    let (header, sealed) = bytes.split_at(HEADER_SIZE);
    let (salt, nonce_bytes) = header[1..].split_at(SALT_SIZE);

    let derived = derive_key(key, salt)?;
    let cipher = Aes256Gcm::new_from_slice(&derived[..])
        .map_err(|_| VaultError::AuthenticationFailure)?;

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: sealed,
                aad: &header[..1],
            },
        )
        .map_err(|_| VaultError::AuthenticationFailure)?;

    SecretString::from_utf8(plaintext).ok_or(VaultError::AuthenticationFailure)
}
