//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the API
//! base URL, which backend holds the access token, and the last login email.
//!
//! Configuration is stored at `~/.config/budgetpad/config.json`. Environment
//! variables (`BUDGETPAD_API_URL`, `BUDGETPAD_TOKEN_BACKEND`, `BUDGETPAD_EMAIL`)
//! override the file.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "budgetpad";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Number of rows in the recent transactions view
pub const DEFAULT_RECENT_LIMIT: u32 = 5;

pub const ENV_API_URL: &str = "BUDGETPAD_API_URL";
pub const ENV_TOKEN_BACKEND: &str = "BUDGETPAD_TOKEN_BACKEND";
pub const ENV_EMAIL: &str = "BUDGETPAD_EMAIL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    Keyring,
    #[default]
    File,
    Memory,
}

impl FromStr for TokenBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyring" => Ok(TokenBackend::Keyring),
            "file" => Ok(TokenBackend::File),
            "memory" => Ok(TokenBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown token backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub token_backend: TokenBackend,
    pub last_email: Option<String>,
    pub recent_limit: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Load the config file (defaults on failure) and apply environment overrides.
    pub fn load_with_env() -> Self {
        let mut config = match Self::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = Some(url.trim().to_string());
        }
        if let Some(backend) = lookup(ENV_TOKEN_BACKEND) {
            match backend.parse() {
                Ok(b) => self.token_backend = b,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_TOKEN_BACKEND),
            }
        }
        if let Some(email) = lookup(ENV_EMAIL).filter(|e| !e.trim().is_empty()) {
            self.last_email = Some(email.trim().to_string());
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn recent_limit(&self) -> u32 {
        self.recent_limit.unwrap_or(DEFAULT_RECENT_LIMIT)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// The configured token backend, falling back to `./cache` for the file backend.
    pub fn token_storage(&self) -> Box<dyn TokenStorage> {
        match self.token_backend {
            TokenBackend::Keyring => Box::new(KeyringStorage::new()),
            TokenBackend::Memory => Box::new(MemoryStorage::default()),
            TokenBackend::File => {
                let dir = self.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
                Box::new(FileStorage::in_dir(dir))
            }
        }
    }
}
