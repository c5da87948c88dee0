//! Per-page-load authorization gate.
//!
//! The gate runs once, before any view refresh, and either grants the page or
//! issues a redirect. A redirect ends the page load.

use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info};

use super::session::{Session, SessionProbe};
use super::TokenStore;

pub const APP_ROUTE: &str = "/";
pub const LOGIN_ROUTE: &str = "/login";
pub const REGISTER_ROUTE: &str = "/register";

/// Query parameter carrying a one-time token on return from the OAuth provider
pub const CALLBACK_TOKEN_PARAM: &str = "token";

/// Origin used to resolve relative page URLs; never contacted.
const PAGE_ORIGIN: &str = "http://localhost/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCategory {
    /// Requires an authenticated session
    AppPage,
    /// Login/register: requires the absence of one
    AuthPage,
    Other,
}

impl PageCategory {
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/index.html" => PageCategory::AppPage,
            "/login" | "/login.html" | "/register" | "/register.html" => PageCategory::AuthPage,
            _ => PageCategory::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unchecked,
    Granted,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Page may render. `session` is present when a probe ran and succeeded.
    Granted { session: Option<Session> },
    /// Terminal for this page load
    Redirect { to: &'static str },
}

impl GateDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Granted { .. })
    }
}

pub struct AuthGate {
    probe: SessionProbe,
    tokens: Arc<TokenStore>,
    state: GateState,
    decision: Option<GateDecision>,
}

impl AuthGate {
    pub fn new(probe: SessionProbe, tokens: Arc<TokenStore>) -> Self {
        Self {
            probe,
            tokens,
            state: GateState::Unchecked,
            decision: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Decide whether the page may render. Evaluated once; later calls return the same decision.
    pub async fn evaluate(&mut self, category: PageCategory) -> GateDecision {
        if let Some(decision) = &self.decision {
            return decision.clone();
        }

        let decision = match category {
            PageCategory::AppPage => {
                let session = self.probe.check().await;
                if session.authenticated {
                    GateDecision::Granted {
                        session: Some(session),
                    }
                } else {
                    GateDecision::Redirect { to: LOGIN_ROUTE }
                }
            }
            PageCategory::AuthPage => {
                if !self.tokens.has_token() {
                    debug!("No stored token on auth page, skipping probe");
                    GateDecision::Granted { session: None }
                } else if self.probe.check().await.authenticated {
                    GateDecision::Redirect { to: APP_ROUTE }
                } else {
                    GateDecision::Granted { session: None }
                }
            }
            PageCategory::Other => GateDecision::Granted { session: None },
        };

        self.state = if decision.is_granted() {
            GateState::Granted
        } else {
            GateState::Denied
        };
        info!(?category, state = ?self.state, "Auth gate evaluated");
        self.decision = Some(decision.clone());
        decision
    }
}

/// Visible page location after any one-time token has been stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Option<String>,
}

impl Location {
    pub fn category(&self) -> PageCategory {
        PageCategory::from_path(&self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(q) => write!(f, "{}?{}", self.path, q),
            None => f.write_str(&self.path),
        }
    }
}

/// Store a one-time callback token carried in `url` and return the location without it.
///
/// Must run before the gate so a reload of the returned location never re-consumes the token.
pub fn consume_callback_token(url: &str, tokens: &TokenStore) -> Location {
    let parsed = Url::parse(PAGE_ORIGIN).and_then(|origin| origin.join(url));
    let mut parsed = match parsed {
        Ok(u) => u,
        Err(e) => {
            debug!(error = %e, "Unparseable page URL, using it as a plain path");
            return Location {
                path: url.to_string(),
                query: None,
            };
        }
    };

    let mut token = None;
    let mut remaining = Vec::new();
    for (key, value) in parsed.query_pairs() {
        if key == CALLBACK_TOKEN_PARAM {
            token = Some(value.into_owned());
        } else {
            remaining.push((key.into_owned(), value.into_owned()));
        }
    }

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        info!("Consuming one-time token from callback URL");
        tokens.set(token);
    }

    if remaining.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(remaining);
    }

    Location {
        path: parsed.path().to_string(),
        query: parsed.query().map(str::to_string),
    }
}
