use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use crate::auth::TokenStore;

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::ApiError;

/// Sends requests through the transport, attaching the stored bearer token when one exists.
///
/// The requester never inspects status codes; expiry is discovered by whoever reads the response.
#[derive(Clone)]
pub struct AuthenticatedRequester {
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStore>,
}

impl AuthenticatedRequester {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<TokenStore>) -> Self {
        Self { transport, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub async fn request(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        if let Some(token) = self.tokens.get() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    request.headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    // Not representable as a header; the server will treat us as anonymous.
                    warn!("Stored token contains invalid header characters, sending unauthenticated");
                }
            }
        }
        debug!(method = %request.method, target = %request.target(), "Dispatching request");
        self.transport.send(request).await
    }

    /// Send a request without the stored token (login/register).
    pub async fn request_anonymous(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport.send(request).await
    }
}
