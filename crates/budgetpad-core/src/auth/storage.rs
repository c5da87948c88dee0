//! Durable single-slot backends for the bearer token.
//!
//! Each backend holds at most one token. `TokenStore` wraps them and turns
//! every failure into "no session", so errors here are only ever logged.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::warn;

const SERVICE_NAME: &str = "budgetpad";

/// Keychain account name for the single token slot
const TOKEN_ACCOUNT: &str = "access_token";

/// Token file name in cache directory
pub const TOKEN_FILE: &str = "token.json";

pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, token: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

// ============================================================================
// OS keychain
// ============================================================================

pub struct KeyringStorage {
    account: String,
}

impl KeyringStorage {
    pub fn new() -> Self {
        Self {
            account: TOKEN_ACCOUNT.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for KeyringStorage {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn store(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn remove(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

// ============================================================================
// JSON file
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: DateTime<Utc>,
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Token file inside the given cache directory
    pub fn in_dir(cache_dir: PathBuf) -> Self {
        Self::new(cache_dir.join(TOKEN_FILE))
    }
}

impl TokenStorage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        // A damaged slot reads as empty so the next `store` can overwrite it.
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable token file, treating as absent");
                return Ok(None);
            }
        };
        match serde_json::from_str::<StoredToken>(&contents) {
            Ok(stored) => Ok(Some(stored.token)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt token file, treating as absent");
                Ok(None)
            }
        }
    }

    fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredToken {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove token file")?;
        }
        Ok(())
    }
}

// ============================================================================
// Process memory
// ============================================================================

#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory token slot poisoned"))?;
        Ok(slot.clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory token slot poisoned"))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory token slot poisoned"))?;
        *slot = None;
        Ok(())
    }
}
