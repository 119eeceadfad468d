//! End-to-end vault tests over the file-backed persistence.
//!
//! Each test uses a fresh temporary directory and reopens the store to
//! confirm that what was written survives a restart.

use tempfile::TempDir;
use vaultkeep_integration_tests::file_store;
use vaultkeep_secrets::{
    CipherBlob, CredentialUpdate, GenerationPolicy, MasterKey, NewCredential, Query,
    SecretGenerator, VaultError,
};

fn key() -> MasterKey {
    MasterKey::new(vec![7u8; 32]).unwrap()
}

#[tokio::test]
async fn test_generated_secret_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let key = key();

    let secret = SecretGenerator::default()
        .generate(&GenerationPolicy::with_length(20))
        .unwrap();
    let expected = secret.expose_secret().to_string();
    assert_eq!(expected.chars().count(), 20);

    let store = file_store(dir.path(), "alice");
    store.load().await.unwrap();
    let record = store
        .add(
            NewCredential::new("GitHub", "alice", secret).with_category("Work"),
            &key,
        )
        .await
        .unwrap();

    let reopened = file_store(dir.path(), "alice");
    let loaded = reopened.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, record.id);
    assert_eq!(loaded[0].category, "Work");

    let revealed = reopened.reveal(&loaded[0], &key).unwrap();
    assert_eq!(revealed.expose_secret(), expected);
}

#[tokio::test]
async fn test_ciphertext_on_disk_does_not_contain_plaintext() {
    let dir = TempDir::new().unwrap();
    let store = file_store(dir.path(), "alice");
    store.load().await.unwrap();
    store
        .add(NewCredential::new("Bank", "alice", "hunter2-very-secret"), &key())
        .await
        .unwrap();

    let contents = std::fs::read_to_string(dir.path().join("alice.json")).unwrap();
    assert!(!contents.contains("hunter2-very-secret"));

    let document: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(document["version"], 1);
    let stored = &document["records"][0];
    assert_eq!(stored["title"], "Bank");
    assert_eq!(stored["user_id"], "alice");
    assert!(stored.get("secret").is_none());
    let ciphertext = stored["secret_ciphertext"].as_str().unwrap();
    assert!(CipherBlob::from_base64(ciphertext).unwrap().len() > "hunter2-very-secret".len());
}

#[tokio::test]
async fn test_wrong_key_fails_authentication() {
    let dir = TempDir::new().unwrap();
    let store = file_store(dir.path(), "alice");
    store.load().await.unwrap();
    let record = store
        .add(NewCredential::new("Mail", "alice", "pw"), &key())
        .await
        .unwrap();

    let other = MasterKey::new(vec![8u8; 32]).unwrap();
    let reopened = file_store(dir.path(), "alice");
    reopened.load().await.unwrap();
    let err = reopened.reveal_by_id(&record.id, &other).await.unwrap_err();
    assert!(matches!(err, VaultError::AuthenticationFailure));
}

#[tokio::test]
async fn test_users_are_isolated() {
    let dir = TempDir::new().unwrap();
    let alice = file_store(dir.path(), "alice");
    alice.load().await.unwrap();
    alice
        .add(NewCredential::new("Alice's", "a", "pw"), &key())
        .await
        .unwrap();

    let bob = file_store(dir.path(), "bob");
    assert!(bob.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filter_edit_and_remove_persist() {
    let dir = TempDir::new().unwrap();
    let key = key();
    let store = file_store(dir.path(), "alice");
    store.load().await.unwrap();

    let github = store
        .add(
            NewCredential::new("GitHub", "alice", "a").with_category("Work"),
            &key,
        )
        .await
        .unwrap();
    let gmail = store
        .add(
            NewCredential::new("Gmail", "alice@gmail.com", "b").with_category("Personal"),
            &key,
        )
        .await
        .unwrap();

    let work = store.search(&Query::all().with_category("work")).await;
    assert_eq!(work.len(), 1);
    assert_eq!(work[0].id, github.id);

    let by_text = store.search(&Query::all().with_search("GMAIL")).await;
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].id, gmail.id);

    let changes = CredentialUpdate {
        title: Some("GitHub Enterprise".to_string()),
        secret: Some("rotated".into()),
        ..Default::default()
    };
    store.update(&github.id, changes, &key).await.unwrap();
    store.remove(&gmail.id).await.unwrap();

    let reopened = file_store(dir.path(), "alice");
    let loaded = reopened.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "GitHub Enterprise");
    assert!(loaded[0].updated_at > loaded[0].created_at);
    let secret = reopened.reveal(&loaded[0], &key).unwrap();
    assert_eq!(secret.expose_secret(), "rotated");
}
