//! Persistence collaborators.
//!
//! Defines the [`Persistence`] trait the store talks to, plus two backends:
//! [`MemoryPersistence`] (in-process) and [`FilePersistence`], which keeps
//! one JSON document per user under a base directory. Records arrive here
//! already sealed; neither backend ever sees plaintext secrets.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use vaultkeep_core::{CredentialId, UserId};

use crate::error::PersistenceError;
use crate::types::CredentialRecord;

/// Result alias for persistence calls.
pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

/// CRUD-style record storage keyed by user.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// All records owned by `user`, newest first.
    async fn list_by_user(&self, user: &UserId) -> PersistenceResult<Vec<CredentialRecord>>;

    /// Store a new record. Fails with `Conflict` if the id already exists.
    async fn insert(&self, record: CredentialRecord) -> PersistenceResult<CredentialRecord>;

    /// Replace an existing record. Fails with `NotFound` if it does not exist.
    async fn update(&self, record: CredentialRecord) -> PersistenceResult<CredentialRecord>;

    /// Delete a record. Fails with `NotFound` if it does not exist.
    async fn delete(&self, user: &UserId, id: &CredentialId) -> PersistenceResult<()>;
}

fn newest_first(records: &mut [CredentialRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn insert_into(
    records: &mut Vec<CredentialRecord>,
    record: CredentialRecord,
) -> PersistenceResult<CredentialRecord> {
    if records.iter().any(|r| r.id == record.id) {
        return Err(PersistenceError::Conflict(record.id.to_string()));
    }
    records.push(record.clone());
    Ok(record)
}

fn update_in(
    records: &mut [CredentialRecord],
    record: CredentialRecord,
) -> PersistenceResult<CredentialRecord> {
    let slot = records
        .iter_mut()
        .find(|r| r.id == record.id)
        .ok_or_else(|| PersistenceError::NotFound(record.id.to_string()))?;
    *slot = record.clone();
    Ok(record)
}

fn delete_from(records: &mut Vec<CredentialRecord>, id: &CredentialId) -> PersistenceResult<()> {
    let before = records.len();
    records.retain(|r| &r.id != id);
    if records.len() == before {
        return Err(PersistenceError::NotFound(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// In-process persistence.
///
/// Can be taken offline with [`MemoryPersistence::set_online`] to simulate an
/// unreachable backend.
pub struct MemoryPersistence {
    records: RwLock<HashMap<UserId, Vec<CredentialRecord>>>,
    online: AtomicBool,
}

impl Default for MemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Total number of records across all users.
    pub async fn count(&self) -> usize {
        self.records.read().await.values().map(Vec::len).sum()
    }

    fn ensure_online(&self) -> PersistenceResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PersistenceError::Unavailable("backend offline".to_string()))
        }
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn list_by_user(&self, user: &UserId) -> PersistenceResult<Vec<CredentialRecord>> {
        self.ensure_online()?;
        let mut records = self
            .records
            .read()
            .await
            .get(user)
            .cloned()
            .unwrap_or_default();
        newest_first(&mut records);
        Ok(records)
    }

    async fn insert(&self, record: CredentialRecord) -> PersistenceResult<CredentialRecord> {
        self.ensure_online()?;
        let mut all = self.records.write().await;
        insert_into(all.entry(record.user_id.clone()).or_default(), record)
    }

    async fn update(&self, record: CredentialRecord) -> PersistenceResult<CredentialRecord> {
        self.ensure_online()?;
        let mut all = self.records.write().await;
        match all.get_mut(&record.user_id) {
            Some(records) => update_in(records, record),
            None => Err(PersistenceError::NotFound(record.id.to_string())),
        }
    }

    async fn delete(&self, user: &UserId, id: &CredentialId) -> PersistenceResult<()> {
        self.ensure_online()?;
        let mut all = self.records.write().await;
        match all.get_mut(user) {
            Some(records) => delete_from(records, id),
            None => Err(PersistenceError::NotFound(id.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

const FILE_FORMAT_VERSION: u32 = 1;

/// On-disk document for one user's vault.
#[derive(Debug, Serialize, Deserialize)]
struct VaultFile {
    version: u32,
    records: Vec<CredentialRecord>,
}

/// File-system-backed persistence.
///
/// Each user's records live in `{base_dir}/{user_id}.json`, written
/// atomically (temp file, then rename). On Unix the directory is created
/// with mode `0700` and files with `0600`.
pub struct FilePersistence {
    base_dir: PathBuf,
    // Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl FilePersistence {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn user_path(&self, user: &UserId) -> PersistenceResult<PathBuf> {
        if !user.is_path_safe() {
            return Err(PersistenceError::InvalidUser(user.to_string()));
        }
        Ok(self.base_dir.join(format!("{user}.json")))
    }

    async fn ensure_dir(&self) -> PersistenceResult<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            tokio::fs::set_permissions(&self.base_dir, perms).await?;
        }

        Ok(())
    }

    async fn read_records(&self, path: &Path) -> PersistenceResult<Vec<CredentialRecord>> {
        match tokio::fs::read_to_string(path).await {
            Ok(data) => {
                let file: VaultFile = serde_json::from_str(&data)?;
                if file.version != FILE_FORMAT_VERSION {
                    return Err(PersistenceError::Unavailable(format!(
                        "unsupported vault file version {}",
                        file.version
                    )));
                }
                Ok(file.records)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_records(
        &self,
        path: &Path,
        records: Vec<CredentialRecord>,
    ) -> PersistenceResult<()> {
        self.ensure_dir().await?;

        let file = VaultFile {
            version: FILE_FORMAT_VERSION,
            records,
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json.as_bytes()).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&temp_path, perms).await?;
        }

        tokio::fs::rename(&temp_path, path).await?;
        debug!(path = %path.display(), count = file.records.len(), "wrote vault file");
        Ok(())
    }
}

#[async_trait]
impl Persistence for FilePersistence {
    async fn list_by_user(&self, user: &UserId) -> PersistenceResult<Vec<CredentialRecord>> {
        let path = self.user_path(user)?;
        let mut records = self.read_records(&path).await?;
        newest_first(&mut records);
        Ok(records)
    }

    async fn insert(&self, record: CredentialRecord) -> PersistenceResult<CredentialRecord> {
        let path = self.user_path(&record.user_id)?;
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records(&path).await?;
        let stored = insert_into(&mut records, record)?;
        self.write_records(&path, records).await?;
        Ok(stored)
    }

    async fn update(&self, record: CredentialRecord) -> PersistenceResult<CredentialRecord> {
        let path = self.user_path(&record.user_id)?;
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records(&path).await?;
        let stored = update_in(&mut records, record)?;
        self.write_records(&path, records).await?;
        Ok(stored)
    }

    async fn delete(&self, user: &UserId, id: &CredentialId) -> PersistenceResult<()> {
        let path = self.user_path(user)?;
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_records(&path).await?;
        delete_from(&mut records, id)?;
        self.write_records(&path, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CipherBlob;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn record(user: &str, title: &str, age_secs: i64) -> CredentialRecord {
        let at = Utc::now() - Duration::seconds(age_secs);
        CredentialRecord {
            id: CredentialId::generate(),
            user_id: UserId::new(user),
            title: title.to_string(),
            username: "someone".to_string(),
            secret_ciphertext: CipherBlob::from_bytes(vec![9; 45]),
            url: None,
            notes: None,
            category: "Personal".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    fn titles(records: &[CredentialRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_memory_lists_newest_first_per_user() {
        let backend = MemoryPersistence::new();
        backend.insert(record("alice", "old", 60)).await.unwrap();
        backend.insert(record("alice", "new", 1)).await.unwrap();
        backend.insert(record("bob", "other", 5)).await.unwrap();

        let alice = backend.list_by_user(&UserId::new("alice")).await.unwrap();
        assert_eq!(titles(&alice), vec!["new", "old"]);
        assert_eq!(backend.count().await, 3);
    }

    #[tokio::test]
    async fn test_memory_duplicate_insert_conflicts() {
        let backend = MemoryPersistence::new();
        let r = record("alice", "a", 0);
        backend.insert(r.clone()).await.unwrap();
        assert!(matches!(
            backend.insert(r).await,
            Err(PersistenceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_offline() {
        let backend = MemoryPersistence::new();
        backend.set_online(false);
        assert!(matches!(
            backend.list_by_user(&UserId::new("alice")).await,
            Err(PersistenceError::Unavailable(_))
        ));
        assert!(matches!(
            backend.insert(record("alice", "a", 0)).await,
            Err(PersistenceError::Unavailable(_))
        ));
        backend.set_online(true);
        assert_eq!(backend.count().await, 0);
    }

    #[tokio::test]
    async fn test_memory_update_and_delete() {
        let backend = MemoryPersistence::new();
        let user = UserId::new("alice");
        let mut r = backend.insert(record("alice", "a", 0)).await.unwrap();

        r.title = "renamed".to_string();
        backend.update(r.clone()).await.unwrap();
        let listed = backend.list_by_user(&user).await.unwrap();
        assert_eq!(titles(&listed), vec!["renamed"]);

        backend.delete(&user, &r.id).await.unwrap();
        assert!(matches!(
            backend.delete(&user, &r.id).await,
            Err(PersistenceError::NotFound(_))
        ));
        assert!(matches!(
            backend.update(record("carol", "x", 0)).await,
            Err(PersistenceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_file_round_trip_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let user = UserId::new("alice");
        {
            let backend = FilePersistence::new(tmp.path());
            backend.insert(record("alice", "first", 30)).await.unwrap();
            backend.insert(record("alice", "second", 10)).await.unwrap();
        }

        let reopened = FilePersistence::new(tmp.path());
        let records = reopened.list_by_user(&user).await.unwrap();
        assert_eq!(titles(&records), vec!["second", "first"]);
        assert_eq!(records[0].secret_ciphertext.len(), 45);
    }

    #[tokio::test]
    async fn test_file_missing_user_is_empty() {
        let tmp = TempDir::new().unwrap();
        let backend = FilePersistence::new(tmp.path().join("not-yet-created"));
        assert!(backend
            .list_by_user(&UserId::new("nobody"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_file_rejects_unsafe_user_id() {
        let tmp = TempDir::new().unwrap();
        let backend = FilePersistence::new(tmp.path());
        assert!(matches!(
            backend.list_by_user(&UserId::new("../escape")).await,
            Err(PersistenceError::InvalidUser(_))
        ));
    }

    #[tokio::test]
    async fn test_file_update_delete_and_conflict() {
        let tmp = TempDir::new().unwrap();
        let backend = FilePersistence::new(tmp.path());
        let user = UserId::new("alice");

        let mut r = backend.insert(record("alice", "a", 0)).await.unwrap();
        assert!(matches!(
            backend.insert(r.clone()).await,
            Err(PersistenceError::Conflict(_))
        ));

        r.username = "changed".to_string();
        backend.update(r.clone()).await.unwrap();
        let listed = backend.list_by_user(&user).await.unwrap();
        assert_eq!(listed[0].username, "changed");

        backend.delete(&user, &r.id).await.unwrap();
        assert!(backend.list_by_user(&user).await.unwrap().is_empty());
        assert!(matches!(
            backend.delete(&user, &r.id).await,
            Err(PersistenceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_file_corrupt_document_is_an_error() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("alice.json"), "{ not json")
            .await
            .unwrap();
        let backend = FilePersistence::new(tmp.path());
        assert!(matches!(
            backend.list_by_user(&UserId::new("alice")).await,
            Err(PersistenceError::Json(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("vault");
        let backend = FilePersistence::new(&dir);
        backend.insert(record("alice", "a", 0)).await.unwrap();

        let file_mode = tokio::fs::metadata(dir.join("alice.json"))
            .await
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        let dir_mode = tokio::fs::metadata(&dir).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        assert_eq!(dir_mode, 0o700);
    }
}
