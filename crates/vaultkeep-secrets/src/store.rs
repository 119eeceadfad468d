//! Session-scoped credential store.
//!
//! [`CredentialStore`] holds the current user's records in memory, sealed,
//! and keeps that set in step with a [`Persistence`] collaborator. The set is
//! tagged with the user it was built for; after a change of session it is
//! hidden until the new user loads or adds. Writes go
//! to persistence first; the in-memory set only changes once the backend has
//! confirmed. Plaintext is produced per call by [`CredentialStore::reveal`]
//! and never cached.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use vaultkeep_core::config::{Config, DEFAULT_CATEGORY};
use vaultkeep_core::{CredentialId, SecretString, UserId};

use crate::crypto::{self, MasterKey};
use crate::error::{PersistenceError, Result, VaultError};
use crate::identity::Identity;
use crate::persistence::Persistence;
use crate::query::{self, Query};
use crate::types::{non_blank, CredentialRecord, CredentialUpdate, NewCredential};

/// Default timeout applied to persistence calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// In-memory records and the user they belong to.
#[derive(Default)]
struct Vault {
    owner: Option<UserId>,
    records: Vec<CredentialRecord>,
}

impl Vault {
    /// The records, if they belong to `user`.
    fn records_for(&self, user: &UserId) -> &[CredentialRecord] {
        if self.owner.as_ref() == Some(user) {
            &self.records
        } else {
            &[]
        }
    }

    fn replace(&mut self, user: UserId, records: Vec<CredentialRecord>) {
        self.owner = Some(user);
        self.records = records;
    }

    /// Put a persisted record into the set, keeping newest-first order.
    ///
    /// Replaces an existing entry with the same id instead of duplicating it.
    /// A set held for another user is discarded first.
    fn insert_confirmed(&mut self, user: &UserId, record: CredentialRecord) {
        if self.owner.as_ref() != Some(user) {
            self.replace(user.clone(), Vec::new());
        }
        if let Some(existing) = self.records.iter_mut().find(|r| r.id == record.id) {
            *existing = record;
            return;
        }
        let position = self
            .records
            .iter()
            .position(|r| r.created_at < record.created_at)
            .unwrap_or(self.records.len());
        self.records.insert(position, record);
    }

    fn remove(&mut self, user: &UserId, id: &CredentialId) {
        if self.owner.as_ref() == Some(user) {
            self.records.retain(|r| &r.id != id);
        }
    }
}

pub struct CredentialStore {
    persistence: Arc<dyn Persistence>,
    identity: Arc<dyn Identity>,
    vault: RwLock<Vault>,
    last_timestamp: Mutex<Option<DateTime<Utc>>>,
    timeout: Duration,
    default_category: String,
}

impl CredentialStore {
    /// Create an empty store. Call [`load`](Self::load) to populate it.
    pub fn new(persistence: Arc<dyn Persistence>, identity: Arc<dyn Identity>) -> Self {
        Self {
            persistence,
            identity,
            vault: RwLock::new(Vault::default()),
            last_timestamp: Mutex::new(None),
            timeout: DEFAULT_TIMEOUT,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Create a store using the timeout and default category from `config`.
    pub fn from_config(
        persistence: Arc<dyn Persistence>,
        identity: Arc<dyn Identity>,
        config: &Config,
    ) -> Self {
        Self::new(persistence, identity)
            .with_timeout(config.storage_timeout())
            .with_default_category(config.vault.default_category.clone())
    }

    /// Set the timeout applied to every persistence call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the category given to records created without one.
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if !category.trim().is_empty() {
            self.default_category = category.trim().to_string();
        }
        self
    }

    /// Resolve the signed-in user or fail with `Unauthenticated`.
    async fn session(&self) -> Result<UserId> {
        self.identity
            .current_user()
            .await?
            .ok_or(VaultError::Unauthenticated)
    }

    /// Run a persistence call under the configured timeout.
    async fn call<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = std::result::Result<T, PersistenceError>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(VaultError::from),
            Err(_) => Err(VaultError::PersistenceUnavailable(format!(
                "{operation} timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    /// Next store timestamp: wall clock, but always after the last one issued.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self
            .last_timestamp
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let wall = Utc::now();
        let now = match *last {
            Some(prev) if prev >= wall => prev + chrono::Duration::nanoseconds(1),
            _ => wall,
        };
        *last = Some(now);
        now
    }

    /// Make sure later timestamps do not precede `seen`.
    fn observe_timestamp(&self, seen: DateTime<Utc>) {
        let mut last = self
            .last_timestamp
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if last.map_or(true, |prev| seen > prev) {
            *last = Some(seen);
        }
    }

    fn resolve_category(&self, category: Option<String>) -> String {
        non_blank(category).unwrap_or_else(|| self.default_category.clone())
    }

    /// Run `f` over the records visible to the signed-in user.
    ///
    /// Without a session, or when the set belongs to someone else, `f` sees
    /// nothing.
    async fn with_visible<R>(&self, f: impl FnOnce(&[CredentialRecord]) -> R) -> R {
        let user = self.identity.current_user().await.ok().flatten();
        let vault = self.vault.read().await;
        match user {
            Some(user) => f(vault.records_for(&user)),
            None => f(&[]),
        }
    }

    /// Look up a record owned by `user`.
    async fn owned(&self, user: &UserId, id: &CredentialId) -> Result<CredentialRecord> {
        self.vault
            .read()
            .await
            .records_for(user)
            .iter()
            .find(|r| &r.id == id && &r.user_id == user)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    /// Fetch every record for the current user and replace the in-memory set.
    ///
    /// Records that fail schema validation are skipped with a warning.
    pub async fn load(&self) -> Result<Vec<CredentialRecord>> {
        let user = self.session().await?;
        let fetched = self
            .call("list_by_user", self.persistence.list_by_user(&user))
            .await?;
        let fetched_count = fetched.len();

        let mut loaded: Vec<CredentialRecord> = Vec::with_capacity(fetched_count);
        for record in fetched {
            if let Err(e) = record.validate_for(&user) {
                warn!(id = %record.id, "skipping invalid record: {e}");
                continue;
            }
            if loaded.iter().any(|r| r.id == record.id) {
                warn!(id = %record.id, "skipping duplicate record id");
                continue;
            }
            loaded.push(record);
        }
        loaded.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(latest) = loaded.iter().map(|r| r.updated_at).max() {
            self.observe_timestamp(latest);
        }

        self.vault.write().await.replace(user.clone(), loaded.clone());
        info!(
            user = %user,
            count = loaded.len(),
            skipped = fetched_count - loaded.len(),
            "loaded credentials"
        );
        Ok(loaded)
    }

    /// Seal and persist a new credential.
    ///
    /// The in-memory set is only touched after persistence confirms the write.
    pub async fn add(&self, new: NewCredential, key: &MasterKey) -> Result<CredentialRecord> {
        let user = self.session().await?;

        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(VaultError::InvalidRecord("title must not be empty".to_string()));
        }
        if new.secret.is_empty() {
            return Err(VaultError::InvalidRecord("secret must not be empty".to_string()));
        }

        let secret_ciphertext = crypto::encrypt(new.secret.expose_secret(), key)?;
        let now = self.next_timestamp();
        let record = CredentialRecord {
            id: CredentialId::generate(),
            user_id: user,
            title,
            username: new.username.trim().to_string(),
            secret_ciphertext,
            url: non_blank(new.url),
            notes: non_blank(new.notes),
            category: self.resolve_category(new.category),
            created_at: now,
            updated_at: now,
        };

        let stored = self.call("insert", self.persistence.insert(record)).await?;
        self.vault
            .write()
            .await
            .insert_confirmed(&stored.user_id, stored.clone());
        debug!(id = %stored.id, category = %stored.category, "added credential");
        Ok(stored)
    }

    /// Decrypt a record's secret. Nothing is cached.
    pub fn reveal(&self, record: &CredentialRecord, key: &MasterKey) -> Result<SecretString> {
        let secret = crypto::decrypt(&record.secret_ciphertext, key)?;
        debug!(id = %record.id, "revealed credential");
        Ok(secret)
    }

    /// Decrypt the secret of one of the signed-in user's records.
    pub async fn reveal_by_id(&self, id: &CredentialId, key: &MasterKey) -> Result<SecretString> {
        let user = self.session().await?;
        let record = self.owned(&user, id).await?;
        self.reveal(&record, key)
    }

    /// Apply field edits to a record and persist them.
    ///
    /// A new secret is sealed under `key`. `updated_at` is bumped.
    pub async fn update(
        &self,
        id: &CredentialId,
        changes: CredentialUpdate,
        key: &MasterKey,
    ) -> Result<CredentialRecord> {
        let user = self.session().await?;
        let mut record = self.owned(&user, id).await?;

        if let Some(title) = changes.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(VaultError::InvalidRecord("title must not be empty".to_string()));
            }
            record.title = title;
        }
        if let Some(username) = changes.username {
            record.username = username.trim().to_string();
        }
        if let Some(secret) = changes.secret {
            if secret.is_empty() {
                return Err(VaultError::InvalidRecord("secret must not be empty".to_string()));
            }
            record.secret_ciphertext = crypto::encrypt(secret.expose_secret(), key)?;
        }
        if changes.url.is_some() {
            record.url = non_blank(changes.url);
        }
        if changes.notes.is_some() {
            record.notes = non_blank(changes.notes);
        }
        if changes.category.is_some() {
            record.category = self.resolve_category(changes.category);
        }
        record.updated_at = self.next_timestamp().max(record.created_at);

        let stored = self.call("update", self.persistence.update(record)).await?;
        self.vault.write().await.insert_confirmed(&user, stored.clone());
        debug!(id = %stored.id, "updated credential");
        Ok(stored)
    }

    /// Delete a record from persistence, then from memory.
    pub async fn remove(&self, id: &CredentialId) -> Result<()> {
        let user = self.session().await?;
        self.call("delete", self.persistence.delete(&user, id)).await?;
        self.vault.write().await.remove(&user, id);
        debug!(id = %id, "removed credential");
        Ok(())
    }

    /// Snapshot of the signed-in user's records, newest first.
    pub async fn records(&self) -> Vec<CredentialRecord> {
        self.with_visible(|records| records.to_vec()).await
    }

    pub async fn get(&self, id: &CredentialId) -> Option<CredentialRecord> {
        self.with_visible(|records| records.iter().find(|r| &r.id == id).cloned())
            .await
    }

    pub async fn len(&self) -> usize {
        self.with_visible(|records| records.len()).await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Distinct category names in first-seen order, compared case-insensitively.
    pub async fn categories(&self) -> Vec<String> {
        self.with_visible(|records| {
            let mut seen: Vec<String> = Vec::new();
            for record in records {
                let folded = record.category.to_lowercase();
                if !seen.iter().any(|c| c.to_lowercase() == folded) {
                    seen.push(record.category.clone());
                }
            }
            seen
        })
        .await
    }

    /// Filter the signed-in user's records.
    pub async fn search(&self, query: &Query) -> Vec<CredentialRecord> {
        self.with_visible(|records| query::filter(records, query))
            .await
    }
}
