//! In-process fakes shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;

use crate::api::{ApiError, ApiRequest, ApiResponse, Transport};
use crate::views::{View, ViewName};

type Route = (String, String);

/// Scripted transport: one canned result per method + path, every request recorded.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<Route, Result<ApiResponse, ApiError>>>,
    protected: Mutex<HashSet<Route>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, path: &str, status: StatusCode, body: &str) {
        self.routes.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            Ok(ApiResponse::new(status, body)),
        );
    }

    pub fn fail(&self, method: &str, path: &str, error: ApiError) {
        self.routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), Err(error));
    }

    /// Answer 401 on this route when no `Authorization` header is sent.
    pub fn require_bearer(&self, method: &str, path: &str) {
        self.protected
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap().clone()
    }

    /// `"METHOD path?query"` for every request, in send order
    pub fn targets(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.target()))
            .collect()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method.as_str() == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let key = (request.method.to_string(), request.path.clone());
        let anonymous = !request.headers.contains_key(AUTHORIZATION);
        self.log.lock().unwrap().push(request);
        if anonymous && self.protected.lock().unwrap().contains(&key) {
            return Ok(ApiResponse::new(
                StatusCode::UNAUTHORIZED,
                r#"{"detail":"Not authenticated"}"#,
            ));
        }
        let scripted = self.routes.lock().unwrap().get(&key).cloned();
        scripted.unwrap_or_else(|| {
            Ok(ApiResponse::new(
                StatusCode::NOT_FOUND,
                r#"{"detail":"Not Found"}"#,
            ))
        })
    }
}

/// Shared, ordered record of calls made by fakes and test closures.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn sorted(&self) -> Vec<String> {
        let mut calls = self.calls();
        calls.sort();
        calls
    }
}

pub struct RecordingView {
    name: ViewName,
    log: CallLog,
    failure: Option<ApiError>,
}

impl RecordingView {
    pub fn new(name: ViewName, log: CallLog) -> Self {
        Self {
            name,
            log,
            failure: None,
        }
    }

    pub fn failing(name: ViewName, log: CallLog) -> Self {
        Self {
            name,
            log,
            failure: Some(ApiError::Network("connection reset".to_string())),
        }
    }

    /// Refresh fails with a 401
    pub fn unauthorized(name: ViewName, log: CallLog) -> Self {
        Self {
            name,
            log,
            failure: Some(ApiError::AuthInvalid { status: 401 }),
        }
    }
}

#[async_trait]
impl View for RecordingView {
    async fn refresh(&self) -> Result<(), ApiError> {
        self.log.push(format!("refresh {:?}", self.name));
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn reset(&self) {
        self.log.push(format!("reset {:?}", self.name));
    }

    async fn show_error(&self, _message: String) {
        self.log.push(format!("error {:?}", self.name));
    }
}
