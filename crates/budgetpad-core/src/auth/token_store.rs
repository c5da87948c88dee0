use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::storage::TokenStorage;

/// Owner of the single bearer token.
///
/// `init` reads the backing slot once; `set` and `clear` are the only mutators.
/// Every storage failure degrades to "no session": if the slot cannot be read
/// at startup the store starts unavailable and `get` returns `None`. `set`
/// still attempts the write and the store becomes available once one succeeds.
/// Failed writes leave memory untouched.
pub struct TokenStore {
    storage: Box<dyn TokenStorage>,
    current: RwLock<Option<String>>,
    available: AtomicBool,
}

impl TokenStore {
    pub fn init(storage: Box<dyn TokenStorage>) -> Self {
        let (current, available) = match storage.load() {
            Ok(token) => (token.filter(|t| !t.is_empty()), true),
            Err(e) => {
                warn!(error = %e, "Token storage unavailable, continuing without a session");
                (None, false)
            }
        };
        debug!(has_token = current.is_some(), available, "Token store initialized");

        Self {
            storage,
            current: RwLock::new(current),
            available: AtomicBool::new(available),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_token(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Overwrite the stored token.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() {
            warn!("Refusing to store an empty token");
            return;
        }
        match self.storage.store(&token) {
            Ok(()) => {
                *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
                if !self.available.swap(true, Ordering::Relaxed) {
                    info!("Token storage recovered");
                }
                debug!("Token stored");
            }
            Err(e) => warn!(error = %e, "Failed to persist token"),
        }
    }

    pub fn clear(&self) {
        // The in-memory copy goes first so an invalid token never lingers.
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Err(e) = self.storage.remove() {
            warn!(error = %e, "Failed to remove persisted token");
        }
        debug!("Token cleared");
    }
}
