//! Authentication module for managing the bearer token and the page gate.
//!
//! This module provides:
//! - `TokenStore`: the single persisted credential, over a `TokenStorage` backend
//! - `SessionProbe`: asks `/api/auth/me` whether the credential is still valid
//! - `AuthGate`: per-page-load grant/redirect decision
//! - `consume_callback_token`: one-time token hand-off from the OAuth callback

pub mod gate;
pub mod session;
pub mod storage;
pub mod token_store;

pub use gate::{
    consume_callback_token, AuthGate, GateDecision, GateState, Location, PageCategory, APP_ROUTE,
    LOGIN_ROUTE, REGISTER_ROUTE,
};
pub use session::{Session, SessionProbe};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, TokenStorage};
pub use token_store::TokenStore;
