//! Typed client for the budget planner REST API.
//!
//! Every call goes through the `AuthenticatedRequester`, so the stored
//! bearer token is attached automatically. Login and register are the
//! only anonymous calls.

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::models::{
    AccessToken, Balance, Category, CategoryReportRow, CategoryUpdate, ClearSummary, Identity,
    MonthlyReport, NewCategory, NewTransaction, SeedSummary, Transaction, TransactionUpdate,
};

use super::requester::AuthenticatedRequester;
use super::transport::{ApiRequest, ApiResponse};
use super::ApiError;

// ============================================================================
// Endpoints
// ============================================================================

pub const ME_PATH: &str = "/api/auth/me";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const GOOGLE_LOGIN_PATH: &str = "/api/auth/google/login";
pub const BALANCE_PATH: &str = "/api/reports/balance";
pub const MONTHLY_REPORT_PATH: &str = "/api/reports/monthly";
pub const CATEGORY_REPORT_PATH: &str = "/api/reports/by-category";
pub const TRANSACTIONS_PATH: &str = "/api/transactions";
pub const CATEGORIES_PATH: &str = "/api/categories";
pub const CLEAR_PATH: &str = "/api/debug/clear";
pub const SEED_DEMO_PATH: &str = "/api/debug/seed-demo";

/// API client for the budget planner.
/// Clone is cheap - the requester shares its transport and token store via Arc.
#[derive(Clone)]
pub struct FinanceApi {
    requester: AuthenticatedRequester,
}

impl FinanceApi {
    pub fn new(requester: AuthenticatedRequester) -> Self {
        Self { requester }
    }

    pub fn requester(&self) -> &AuthenticatedRequester {
        &self.requester
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requester.request(request).await?.error_for_status()
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    // ===== Auth =====

    /// Identity of the current token holder
    pub async fn me(&self) -> Result<Identity, ApiError> {
        self.fetch(ApiRequest::get(ME_PATH)).await
    }

    /// Exchange email/password for an access token (OAuth2 password form)
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request =
            ApiRequest::post(LOGIN_PATH).with_form(&[("username", email), ("password", password)]);
        let token: AccessToken = self
            .requester
            .request_anonymous(request)
            .await?
            .error_for_status()?
            .json()?;
        if token.access_token.is_empty() {
            return Err(ApiError::InvalidResponse("Login returned an empty token".to_string()));
        }
        Ok(token.access_token)
    }

    /// Create an account. Registration does not return a token.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let request =
            ApiRequest::post(REGISTER_PATH).with_json(json!({ "email": email, "password": password }));
        self.requester
            .request_anonymous(request)
            .await?
            .error_for_status()?;
        Ok(())
    }

    // ===== Reports =====

    pub async fn balance(&self) -> Result<Balance, ApiError> {
        self.fetch(ApiRequest::get(BALANCE_PATH)).await
    }

    pub async fn monthly_report(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<MonthlyReport, ApiError> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(ApiError::Validation(format!("Invalid month: {}", m)));
            }
        }
        let mut params = Vec::new();
        if let Some(y) = year {
            params.push(format!("year={}", y));
        }
        if let Some(m) = month {
            params.push(format!("month={}", m));
        }
        self.fetch(ApiRequest::get(MONTHLY_REPORT_PATH).with_query(params.join("&")))
            .await
    }

    pub async fn category_report(&self) -> Result<Vec<CategoryReportRow>, ApiError> {
        self.fetch(ApiRequest::get(CATEGORY_REPORT_PATH)).await
    }

    // ===== Transactions =====

    /// List transactions; `query` is an encoded query string (may be empty)
    pub async fn transactions(&self, query: String) -> Result<Vec<Transaction>, ApiError> {
        let list: Vec<Transaction> = self
            .fetch(ApiRequest::get(TRANSACTIONS_PATH).with_query(query))
            .await?;
        debug!(count = list.len(), "Transactions fetched");
        Ok(list)
    }

    pub async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction, ApiError> {
        let body = serde_json::to_value(tx).map_err(|e| ApiError::Validation(e.to_string()))?;
        self.fetch(ApiRequest::post(TRANSACTIONS_PATH).with_json(body))
            .await
    }

    pub async fn transaction(&self, id: i64) -> Result<Transaction, ApiError> {
        self.fetch(ApiRequest::get(format!("{}/{}", TRANSACTIONS_PATH, id)))
            .await
    }

    /// Partial update; unset fields keep their server-side values
    pub async fn update_transaction(
        &self,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction, ApiError> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Validation(e.to_string()))?;
        self.fetch(ApiRequest::put(format!("{}/{}", TRANSACTIONS_PATH, id)).with_json(body))
            .await
    }

    pub async fn delete_transaction(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("{}/{}", TRANSACTIONS_PATH, id)))
            .await?;
        Ok(())
    }

    // ===== Categories =====

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch(ApiRequest::get(CATEGORIES_PATH)).await
    }

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ApiError> {
        let body = serde_json::to_value(category).map_err(|e| ApiError::Validation(e.to_string()))?;
        self.fetch(ApiRequest::post(CATEGORIES_PATH).with_json(body))
            .await
    }

    pub async fn category(&self, id: i64) -> Result<Category, ApiError> {
        self.fetch(ApiRequest::get(format!("{}/{}", CATEGORIES_PATH, id)))
            .await
    }

    pub async fn update_category(
        &self,
        id: i64,
        update: &CategoryUpdate,
    ) -> Result<Category, ApiError> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Validation(e.to_string()))?;
        self.fetch(ApiRequest::put(format!("{}/{}", CATEGORIES_PATH, id)).with_json(body))
            .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("{}/{}", CATEGORIES_PATH, id)))
            .await?;
        Ok(())
    }

    // ===== Maintenance =====

    /// Remove every record owned by the session's user
    pub async fn clear_data(&self) -> Result<ClearSummary, ApiError> {
        self.fetch(ApiRequest::post(CLEAR_PATH)).await
    }

    pub async fn seed_demo(&self) -> Result<SeedSummary, ApiError> {
        self.fetch(ApiRequest::post(SEED_DEMO_PATH)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use rust_decimal::Decimal;

    use super::*;
    use crate::auth::{MemoryStorage, TokenStore};
    use crate::testing::FakeTransport;

    fn api_with(fake: &Arc<FakeTransport>, token: Option<&str>) -> FinanceApi {
        let storage = match token {
            Some(t) => MemoryStorage::with_token(t),
            None => MemoryStorage::default(),
        };
        let tokens = Arc::new(TokenStore::init(Box::new(storage)));
        FinanceApi::new(AuthenticatedRequester::new(fake.clone(), tokens))
    }

    #[tokio::test]
    async fn test_login_sends_form_and_returns_token() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "POST",
            LOGIN_PATH,
            StatusCode::OK,
            r#"{"access_token":"tok-1","token_type":"bearer"}"#,
        );
        let api = api_with(&fake, None);

        let token = api.login("a@b.pl", "secret").await.unwrap();
        assert_eq!(token, "tok-1");

        let sent = fake.requests();
        assert_eq!(
            sent[0].body,
            crate::api::RequestBody::Form(vec![
                ("username".to_string(), "a@b.pl".to_string()),
                ("password".to_string(), "secret".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_login_bad_credentials() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("POST", LOGIN_PATH, StatusCode::UNAUTHORIZED, r#"{"detail":"Invalid credentials"}"#);
        let api = api_with(&fake, None);

        let err = api.login("a@b.pl", "wrong").await.unwrap_err();
        assert!(err.is_auth_invalid());
    }

    #[tokio::test]
    async fn test_balance_parses_decimals() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "GET",
            BALANCE_PATH,
            StatusCode::OK,
            r#"{"income":"10.00","expense":"2.50","net":"7.50"}"#,
        );
        let api = api_with(&fake, Some("t"));

        let balance = api.balance().await.unwrap();
        assert_eq!(balance.net, Decimal::new(750, 2));
    }

    #[tokio::test]
    async fn test_delete_category_accepts_no_content() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("DELETE", "/api/categories/4", StatusCode::NO_CONTENT, "");
        let api = api_with(&fake, Some("t"));

        api.delete_category(4).await.unwrap();
        assert_eq!(fake.targets(), vec!["DELETE /api/categories/4".to_string()]);
    }

    #[tokio::test]
    async fn test_monthly_report_rejects_invalid_month_without_request() {
        let fake = Arc::new(FakeTransport::new());
        let api = api_with(&fake, Some("t"));

        let err = api.monthly_report(Some(2024), Some(13)).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_monthly_report_query() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "GET",
            MONTHLY_REPORT_PATH,
            StatusCode::OK,
            r#"{"year":2024,"month":3,"income":"1","expense":"0","net":"1"}"#,
        );
        let api = api_with(&fake, Some("t"));

        let report = api.monthly_report(Some(2024), Some(3)).await.unwrap();
        assert_eq!(report.month, 3);
        assert_eq!(
            fake.targets(),
            vec!["GET /api/reports/monthly?year=2024&month=3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_server_error_surfaces_detail() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "POST",
            CATEGORIES_PATH,
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Category already exists"}"#,
        );
        let api = api_with(&fake, Some("t"));

        let err = api
            .create_category(&NewCategory {
                name: "Food".to_string(),
                color: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Server error (HTTP 400): Category already exists");
    }

    #[tokio::test]
    async fn test_update_transaction_puts_partial_body() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "PUT",
            "/api/transactions/7",
            StatusCode::OK,
            r#"{"id":7,"type":"expense","amount":"8.00","date":"2024-03-01T12:00:00"}"#,
        );
        let api = api_with(&fake, Some("t"));

        let update = TransactionUpdate {
            amount: Some(Decimal::new(800, 2)),
            ..Default::default()
        };
        let tx = api.update_transaction(7, &update).await.unwrap();
        assert_eq!(tx.amount, Decimal::new(800, 2));

        let sent = fake.requests();
        assert_eq!(fake.targets(), vec!["PUT /api/transactions/7".to_string()]);
        assert_eq!(
            sent[0].body,
            crate::api::RequestBody::Json(json!({"amount": "8.00"}))
        );
    }

    #[tokio::test]
    async fn test_single_category_not_found() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            "GET",
            "/api/categories/3",
            StatusCode::NOT_FOUND,
            r#"{"detail":"Category not found"}"#,
        );
        let api = api_with(&fake, Some("t"));

        let err = api.category(3).await.unwrap_err();
        assert_eq!(err.to_string(), "Server error (HTTP 404): Category not found");
    }
}
