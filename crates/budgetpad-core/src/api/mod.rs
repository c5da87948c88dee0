//! REST API client module for the budget planner service.
//!
//! This module provides the transport seam (`Transport`, `HttpTransport`),
//! the `AuthenticatedRequester` that attaches the stored bearer token, and
//! the typed `FinanceApi` used by the session probe and the views.
//!
//! The API uses bearer token authentication obtained from
//! `/api/auth/login` or the Google OAuth callback.

pub mod client;
pub mod error;
pub mod requester;
pub mod transport;

pub use client::FinanceApi;
pub use error::ApiError;
pub use requester::AuthenticatedRequester;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, RequestBody, Transport};
