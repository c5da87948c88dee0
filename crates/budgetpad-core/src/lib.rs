//! Client core for the budgetpad personal finance tracker.
//!
//! Holds the bearer token, gates each page load on a session probe, talks to
//! the REST API, and keeps the dependent views consistent after every write.
//! Front ends (the `budgetpad` CLI) only render what this crate produces.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod filter;
pub mod forms;
pub mod models;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{App, PageOutcome};
pub use config::Config;
