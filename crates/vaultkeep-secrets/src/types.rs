//! Credential record types.
//!
//! A [`CredentialRecord`] carries its secret only as a [`CipherBlob`]. Title,
//! username, URL, notes, and category are plaintext metadata and are never
//! derived from the ciphertext.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use vaultkeep_core::{CredentialId, SecretString, UserId};

use crate::error::{Result, VaultError};

/// Well-known category names. Any other non-empty name is accepted too.
pub mod categories {
    pub const PERSONAL: &str = "Personal";
    pub const WORK: &str = "Work";
    pub const FINANCE: &str = "Finance";

    /// Categories offered before the user has created any of their own.
    pub const DEFAULTS: [&str; 3] = [PERSONAL, WORK, FINANCE];
}

/// Encrypted, integrity-protected secret including its nonce.
///
/// Stored as standard base64. `Debug` shows only the length.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherBlob(Vec<u8>);

impl CipherBlob {
    /// Wrap raw blob bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode a base64 blob.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map(Self)
            .map_err(|e| VaultError::InvalidRecord(format!("ciphertext is not base64: {e}")))
    }

    /// Encode as standard base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CipherBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[CIPHERTEXT {} bytes]", self.0.len())
    }
}

impl Serialize for CipherBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for CipherBlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

/// One credential entry as held by the store and the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Unique, immutable identifier.
    pub id: CredentialId,

    /// Owner of the record.
    pub user_id: UserId,

    /// Display label. Never empty.
    pub title: String,

    /// Account name at the target site.
    #[serde(default)]
    pub username: String,

    /// The sealed secret.
    pub secret_ciphertext: CipherBlob,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Never empty.
    pub category: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Check the fixed-schema invariants for a record owned by `owner`.
    pub fn validate_for(&self, owner: &UserId) -> Result<()> {
        if self.id.is_empty() {
            return Err(VaultError::InvalidRecord("id must not be empty".to_string()));
        }
        if &self.user_id != owner {
            return Err(VaultError::InvalidRecord(format!(
                "record {} belongs to another user",
                self.id
            )));
        }
        if self.title.trim().is_empty() {
            return Err(VaultError::InvalidRecord(format!(
                "record {} has an empty title",
                self.id
            )));
        }
        if self.category.trim().is_empty() {
            return Err(VaultError::InvalidRecord(format!(
                "record {} has an empty category",
                self.id
            )));
        }
        if self.secret_ciphertext.is_empty() {
            return Err(VaultError::InvalidRecord(format!(
                "record {} has no ciphertext",
                self.id
            )));
        }
        if self.updated_at < self.created_at {
            return Err(VaultError::InvalidRecord(format!(
                "record {} was updated before it was created",
                self.id
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({}) - {}", self.id, self.title, self.category, self.username)
    }
}

/// Input for [`crate::CredentialStore::add`].
#[derive(Debug, Clone, Default)]
pub struct NewCredential {
    pub title: String,
    pub username: String,
    pub secret: SecretString,
    pub url: Option<String>,
    pub notes: Option<String>,
    /// Falls back to the store's default category when `None` or blank.
    pub category: Option<String>,
}

impl NewCredential {
    pub fn new(
        title: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<SecretString>,
    ) -> Self {
        Self {
            title: title.into(),
            username: username.into(),
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Field edits for [`crate::CredentialStore::update`]. `None` leaves a field as is.
///
/// For `url` and `notes`, `Some(String::new())` clears the field.
#[derive(Debug, Clone, Default)]
pub struct CredentialUpdate {
    pub title: Option<String>,
    pub username: Option<String>,
    pub secret: Option<SecretString>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub category: Option<String>,
}

impl CredentialUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.username.is_none()
            && self.secret.is_none()
            && self.url.is_none()
            && self.notes.is_none()
            && self.category.is_none()
    }
}

/// Trim an optional free-text field, mapping blank input to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
