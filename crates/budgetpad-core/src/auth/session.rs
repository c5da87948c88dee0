use tracing::{debug, info};

use crate::api::FinanceApi;

/// Session state derived from a single probe. Never cached across page loads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub authenticated: bool,
    pub identity: Option<String>,
}

impl Session {
    pub fn authenticated(email: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            identity: Some(email.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Asks the API whether the stored token is still valid and who owns it.
#[derive(Clone)]
pub struct SessionProbe {
    api: FinanceApi,
}

impl SessionProbe {
    pub fn new(api: FinanceApi) -> Self {
        Self { api }
    }

    /// One authoritative check, no retries. Any failure clears the stored token.
    pub async fn check(&self) -> Session {
        match self.api.me().await {
            Ok(identity) if looks_like_email(&identity.email) => {
                debug!("Session probe succeeded");
                Session::authenticated(identity.email)
            }
            Ok(_) => {
                info!("Session probe returned no usable identity, clearing token");
                self.api.requester().tokens().clear();
                Session::anonymous()
            }
            Err(e) => {
                info!(error = %e, "Session probe failed, clearing token");
                self.api.requester().tokens().clear();
                Session::anonymous()
            }
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !value.contains(char::is_whitespace),
        None => false,
    }
}
