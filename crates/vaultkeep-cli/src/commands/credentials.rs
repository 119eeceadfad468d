//! Credential management commands.
//!
//! Provides `vaultkeep add|list|reveal|edit|remove|categories`, backed by
//! the file store under the configured data directory.

use std::path::Path;

use clap::Args;
use vaultkeep_core::{Config, CredentialId, SecretString};
use vaultkeep_secrets::{
    categories as known_categories, CredentialRecord, CredentialUpdate, GenerationPolicy,
    NewCredential, Query, SecretGenerator,
};

use crate::session::{open_store, resolve_master_key};

/// Add command arguments.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Display title
    pub title: String,

    /// Account name
    #[arg(short, long, default_value = "")]
    pub username: String,

    /// Site URL
    #[arg(long)]
    pub url: Option<String>,

    /// Category (defaults to the configured default category)
    #[arg(long)]
    pub category: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Password value (if omitted and --generate is not set, prompts for hidden input)
    #[arg(long, conflicts_with = "generate")]
    pub password: Option<String>,

    /// Generate a password using the configured policy
    #[arg(short, long)]
    pub generate: bool,
}

/// List command arguments.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only show this category (case-insensitive)
    #[arg(long)]
    pub category: Option<String>,

    /// Only show titles or usernames containing this text (case-insensitive)
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Edit command arguments.
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Credential id
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub username: Option<String>,

    /// New URL (empty string clears it)
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// New notes (empty string clears them)
    #[arg(long)]
    pub notes: Option<String>,

    /// Prompt for a new password
    #[arg(long, conflicts_with = "generate")]
    pub password: bool,

    /// Replace the password with a generated one
    #[arg(short, long)]
    pub generate: bool,
}

fn read_password(prompt: &str) -> anyhow::Result<SecretString> {
    let value = rpassword::prompt_password(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?;
    Ok(SecretString::new(value))
}

/// Run the add command.
pub async fn add(args: AddArgs, config: &Config, key_file: Option<&Path>) -> anyhow::Result<()> {
    let key = resolve_master_key(key_file)?;

    let secret = if args.generate {
        SecretGenerator::default().generate(&GenerationPolicy::from(&config.generator))?
    } else {
        match args.password {
            Some(password) => SecretString::new(password),
            None => read_password(&format!("Password for '{}': ", args.title))?,
        }
    };
    if secret.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let store = open_store(config).await?;
    let new = NewCredential {
        title: args.title,
        username: args.username,
        secret,
        url: args.url,
        notes: args.notes,
        category: args.category,
    };
    let record = store.add(new, &key).await?;

    println!("Added '{}' ({}) in {}.", record.title, record.id, record.category);
    Ok(())
}

/// Run the list command.
pub async fn list(args: ListArgs, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let query = Query {
        category: args.category,
        search: args.search,
    };
    let records = store.search(&query).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries(&records))?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No credentials found.");
        return Ok(());
    }

    println!("{:<36}  {:<24} {:<24} {:<10} {}", "ID", "TITLE", "USERNAME", "CATEGORY", "URL");
    println!("{}", "-".repeat(110));
    for r in &records {
        println!(
            "{:<36}  {:<24} {:<24} {:<10} {}",
            r.id,
            r.title,
            r.username,
            r.category,
            r.url.as_deref().unwrap_or("")
        );
    }
    println!("\n{} credential(s).", records.len());
    Ok(())
}

/// Metadata-only JSON view of records. Ciphertext is left out.
fn summaries(records: &[CredentialRecord]) -> Vec<serde_json::Value> {
    records
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.id,
                "title": r.title,
                "username": r.username,
                "url": r.url,
                "notes": r.notes,
                "category": r.category,
                "created_at": r.created_at,
                "updated_at": r.updated_at,
            })
        })
        .collect()
}

/// Run the reveal command.
pub async fn reveal(id: &str, config: &Config, key_file: Option<&Path>) -> anyhow::Result<()> {
    let key = resolve_master_key(key_file)?;
    let store = open_store(config).await?;
    let secret = store.reveal_by_id(&CredentialId::new(id), &key).await?;
    println!("{}", secret.expose_secret());
    Ok(())
}

/// Run the edit command.
pub async fn edit(args: EditArgs, config: &Config, key_file: Option<&Path>) -> anyhow::Result<()> {
    let key = resolve_master_key(key_file)?;

    let secret = if args.generate {
        Some(SecretGenerator::default().generate(&GenerationPolicy::from(&config.generator))?)
    } else if args.password {
        Some(read_password("New password: ")?)
    } else {
        None
    };

    let changes = CredentialUpdate {
        title: args.title,
        username: args.username,
        secret,
        url: args.url,
        notes: args.notes,
        category: args.category,
    };
    if changes.is_empty() {
        anyhow::bail!("Nothing to change");
    }

    let store = open_store(config).await?;
    let record = store.update(&CredentialId::new(args.id), changes, &key).await?;
    println!("Updated '{}' ({}).", record.title, record.id);
    Ok(())
}

/// Run the remove command.
pub async fn remove(id: &str, config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    store.remove(&CredentialId::new(id)).await?;
    println!("Credential '{}' deleted.", id);
    Ok(())
}

/// Run the categories command.
pub async fn categories(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let mut names = store.categories().await;
    for known in known_categories::DEFAULTS {
        if !names.iter().any(|n| n.eq_ignore_ascii_case(known)) {
            names.push(known.to_string());
        }
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
