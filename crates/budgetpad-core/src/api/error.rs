use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized (HTTP {status}) - session is no longer valid")]
    AuthInvalid { status: u16 },

    #[error("{0}")]
    Validation(String),

    #[error("Server error (HTTP {status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// FastAPI error envelope: `{"detail": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: serde_json::Value,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the human readable message out of an error body, falling back to the raw text.
    fn detail_from_body(body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(ErrorEnvelope {
                detail: serde_json::Value::String(s),
            }) => Self::truncate_body(&s),
            Ok(ErrorEnvelope { detail }) => Self::truncate_body(&detail.to_string()),
            Err(_) => Self::truncate_body(body.trim()),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => ApiError::AuthInvalid {
                status: status.as_u16(),
            },
            code => ApiError::Server {
                status: code,
                detail: Self::detail_from_body(body),
            },
        }
    }

    pub fn is_auth_invalid(&self) -> bool {
        matches!(self, ApiError::AuthInvalid { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
