//! Page-load orchestration for budgetpad.
//!
//! This module contains the `App` struct that ties the services together.
//! One call to `load` is one page load: a callback token (if any) is consumed,
//! the auth gate runs, and only a granted app page gets its views and the
//! initial refresh. User actions on the app page go through the coordinator so
//! every successful write is followed by the matching refresh batch.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::api::client::GOOGLE_LOGIN_PATH;
use crate::api::{ApiError, AuthenticatedRequester, FinanceApi, HttpTransport, Transport};
use crate::auth::{
    consume_callback_token, AuthGate, GateDecision, Location, PageCategory, Session,
    SessionProbe, TokenStorage, TokenStore, APP_ROUTE, LOGIN_ROUTE,
};
use crate::config::Config;
use crate::coordinator::{MutationEvent, RefreshReport, ViewRefreshCoordinator};
use crate::filter::FilterCriteria;
use crate::forms::{CategoryEditForm, CategoryForm, Credentials, TransactionEditForm, TransactionForm};
use crate::models::{Category, ClearSummary, SeedSummary, Transaction};
use crate::views::{MonthSelection, PageViews, ViewName};

/// Result of one page load.
#[derive(Debug)]
pub enum PageOutcome {
    /// The gate denied the page; nothing else ran.
    Redirect { to: &'static str },
    /// App page granted and initially refreshed
    App {
        identity: Option<String>,
        report: RefreshReport,
    },
    /// Login or register form may be shown
    AuthForm { location: Location },
    Other { location: Location },
}

pub struct App {
    pub config: Config,
    tokens: Arc<TokenStore>,
    api: FinanceApi,
    gate: AuthGate,
    location: Option<Location>,
    session: Option<Session>,
    views: Option<PageViews>,
    coordinator: Option<ViewRefreshCoordinator>,
}

impl App {
    /// Create an app talking HTTP to the configured server.
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(config.api_base_url(), config.request_timeout())?;
        let storage = config.token_storage();
        Ok(Self::with_parts(config, Arc::new(transport), storage))
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport>,
        storage: Box<dyn TokenStorage>,
    ) -> Self {
        let tokens = Arc::new(TokenStore::init(storage));
        let api = FinanceApi::new(AuthenticatedRequester::new(transport, Arc::clone(&tokens)));
        let gate = AuthGate::new(SessionProbe::new(api.clone()), Arc::clone(&tokens));

        Self {
            config,
            tokens,
            api,
            gate,
            location: None,
            session: None,
            views: None,
            coordinator: None,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn api(&self) -> &FinanceApi {
        &self.api
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.identity.as_deref())
    }

    /// Views of a granted app page; `None` on any other page.
    pub fn views(&self) -> Option<&PageViews> {
        self.views.as_ref()
    }

    // =========================================================================
    // Page load
    // =========================================================================

    /// Start a fresh page load at `url`, discarding any state from the previous one.
    pub async fn load(&mut self, url: &str) -> PageOutcome {
        self.gate = AuthGate::new(SessionProbe::new(self.api.clone()), Arc::clone(&self.tokens));
        self.session = None;
        self.views = None;
        self.coordinator = None;

        let location = consume_callback_token(url, &self.tokens);
        let category = location.category();
        debug!(%location, ?category, "Page load");
        self.location = Some(location.clone());

        match self.gate.evaluate(category).await {
            GateDecision::Redirect { to } => {
                info!(from = %location, to, "Redirecting");
                PageOutcome::Redirect { to }
            }
            GateDecision::Granted { session } => match category {
                PageCategory::AppPage => {
                    self.session = session;
                    let views = PageViews::new(&self.api, self.config.recent_limit());
                    let coordinator = ViewRefreshCoordinator::new(views.registry())
                        .with_token_store(Arc::clone(&self.tokens));
                    let report = coordinator.initial().await;
                    self.views = Some(views);
                    self.coordinator = Some(coordinator);
                    PageOutcome::App {
                        identity: self.identity().map(str::to_string),
                        report,
                    }
                }
                PageCategory::AuthPage => PageOutcome::AuthForm { location },
                PageCategory::Other => PageOutcome::Other { location },
            },
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in and store the token. Returns the route to continue to.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&'static str, ApiError> {
        let credentials = credentials.validate()?;
        let token = self.api.login(&credentials.email, &credentials.password).await?;
        self.tokens.set(token);
        info!("Login succeeded");

        // Persisted by the caller with `Config::save`
        self.config.last_email = Some(credentials.email);
        Ok(APP_ROUTE)
    }

    /// Create the account, then log in with the same credentials.
    pub async fn register(&mut self, credentials: &Credentials) -> Result<&'static str, ApiError> {
        let credentials = credentials.validate()?;
        self.api
            .register(&credentials.email, &credentials.password)
            .await?;
        info!("Registration succeeded, logging in");
        self.login(&credentials).await
    }

    pub fn logout(&mut self) -> &'static str {
        self.tokens.clear();
        self.session = None;
        info!("Logged out");
        LOGIN_ROUTE
    }

    /// Full-page redirect target for federated login
    pub fn google_login_url(&self) -> String {
        format!(
            "{}{}",
            self.config.api_base_url().trim_end_matches('/'),
            GOOGLE_LOGIN_PATH
        )
    }

    // =========================================================================
    // App page actions
    // =========================================================================

    fn page(&self) -> Result<(&ViewRefreshCoordinator, &PageViews), ApiError> {
        match (&self.coordinator, &self.views) {
            (Some(coordinator), Some(views)) => Ok((coordinator, views)),
            _ => Err(ApiError::Validation(
                "This action is only available on the main page".to_string(),
            )),
        }
    }

    pub async fn create_transaction(
        &self,
        form: &TransactionForm,
    ) -> Result<(Transaction, RefreshReport), ApiError> {
        let (coordinator, _) = self.page()?;
        let tx = form.validate()?;
        coordinator
            .commit(MutationEvent::TransactionCreated, self.api.create_transaction(&tx))
            .await
    }

    pub async fn update_transaction(
        &self,
        id: i64,
        form: &TransactionEditForm,
    ) -> Result<(Transaction, RefreshReport), ApiError> {
        let (coordinator, _) = self.page()?;
        let update = form.validate()?;
        coordinator
            .commit(MutationEvent::TransactionUpdated, self.api.update_transaction(id, &update))
            .await
    }

    pub async fn delete_transaction(&self, id: i64) -> Result<RefreshReport, ApiError> {
        let (coordinator, _) = self.page()?;
        let ((), report) = coordinator
            .commit(MutationEvent::TransactionDeleted, self.api.delete_transaction(id))
            .await?;
        Ok(report)
    }

    pub async fn create_category(
        &self,
        form: &CategoryForm,
    ) -> Result<(Category, RefreshReport), ApiError> {
        let (coordinator, _) = self.page()?;
        let category = form.validate()?;
        coordinator
            .commit(MutationEvent::CategoryCreated, self.api.create_category(&category))
            .await
    }

    pub async fn update_category(
        &self,
        id: i64,
        form: &CategoryEditForm,
    ) -> Result<(Category, RefreshReport), ApiError> {
        let (coordinator, _) = self.page()?;
        let update = form.validate()?;
        coordinator
            .commit(MutationEvent::CategoryUpdated, self.api.update_category(id, &update))
            .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<RefreshReport, ApiError> {
        let (coordinator, _) = self.page()?;
        let ((), report) = coordinator
            .commit(MutationEvent::CategoryDeleted, self.api.delete_category(id))
            .await?;
        Ok(report)
    }

    /// Remove every record owned by the current user.
    pub async fn clear_data(&self) -> Result<(ClearSummary, RefreshReport), ApiError> {
        let (coordinator, _) = self.page()?;
        coordinator
            .commit(MutationEvent::DataCleared, self.api.clear_data())
            .await
    }

    pub async fn seed_demo(&self) -> Result<(SeedSummary, RefreshReport), ApiError> {
        let (coordinator, _) = self.page()?;
        coordinator
            .commit(MutationEvent::DemoSeeded, self.api.seed_demo())
            .await
    }

    /// Replace the filter and reload only the filtered list.
    pub async fn apply_filter(&self, criteria: FilterCriteria) -> Result<RefreshReport, ApiError> {
        let (coordinator, views) = self.page()?;
        *views.filter.write().await = criteria;
        Ok(coordinator
            .refresh_view(ViewName::FilteredTransactions)
            .await)
    }

    pub async fn load_monthly_report(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<RefreshReport, ApiError> {
        let (coordinator, views) = self.page()?;
        *views.month.write().await = MonthSelection { year, month };
        Ok(coordinator.refresh_view(ViewName::MonthlyReport).await)
    }

    pub async fn refresh_view(&self, name: ViewName) -> Result<RefreshReport, ApiError> {
        let (coordinator, _) = self.page()?;
        Ok(coordinator.refresh_view(name).await)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::api::client::{
        BALANCE_PATH, CATEGORIES_PATH, CATEGORY_REPORT_PATH, CLEAR_PATH, LOGIN_PATH, ME_PATH,
        MONTHLY_REPORT_PATH, REGISTER_PATH, SEED_DEMO_PATH, TRANSACTIONS_PATH,
    };
    use crate::auth::MemoryStorage;
    use crate::models::TxType;
    use crate::testing::FakeTransport;
    use crate::views::ViewState;

    fn app_with(fake: &Arc<FakeTransport>, token: Option<&str>) -> App {
        let storage = match token {
            Some(t) => MemoryStorage::with_token(t),
            None => MemoryStorage::default(),
        };
        App::with_parts(Config::default(), fake.clone(), Box::new(storage))
    }

    /// A server where every read endpoint succeeds
    fn healthy_server() -> Arc<FakeTransport> {
        let fake = Arc::new(FakeTransport::new());
        fake.respond("GET", ME_PATH, StatusCode::OK, r#"{"email":"ola@example.com"}"#);
        fake.require_bearer("GET", ME_PATH);
        fake.respond(
            "GET",
            BALANCE_PATH,
            StatusCode::OK,
            r#"{"income":"100.00","expense":"40.00","net":"60.00"}"#,
        );
        fake.respond(
            "GET",
            TRANSACTIONS_PATH,
            StatusCode::OK,
            r#"[{"id":1,"type":"income","amount":"100.00","description":"Salary","date":"2024-03-01T09:00:00"}]"#,
        );
        fake.respond("GET", CATEGORIES_PATH, StatusCode::OK, r#"[{"id":4,"name":"Food","color":null}]"#);
        fake
    }

    fn reads_of(fake: &FakeTransport) -> Vec<String> {
        let mut reads: Vec<String> = fake
            .targets()
            .into_iter()
            .filter(|t| t.starts_with("GET ") && !t.contains(ME_PATH))
            .collect();
        reads.sort();
        reads
    }

    #[tokio::test]
    async fn test_app_page_without_token_redirects_without_fetching() {
        let fake = healthy_server();
        fake.respond("GET", ME_PATH, StatusCode::UNAUTHORIZED, "");
        let mut app = app_with(&fake, None);

        let outcome = app.load("/").await;

        assert!(matches!(outcome, PageOutcome::Redirect { to: LOGIN_ROUTE }));
        assert_eq!(fake.count("GET", TRANSACTIONS_PATH), 0);
        assert!(app.views().is_none());
    }

    #[tokio::test]
    async fn test_probe_failure_clears_token_and_skips_refresh() {
        let fake = healthy_server();
        fake.respond("GET", ME_PATH, StatusCode::UNAUTHORIZED, "");
        let mut app = app_with(&fake, Some("expired"));

        let outcome = app.load("/").await;

        assert!(matches!(outcome, PageOutcome::Redirect { to: LOGIN_ROUTE }));
        assert_eq!(app.tokens().get(), None);
        assert_eq!(fake.targets(), vec![format!("GET {}", ME_PATH)]);
    }

    #[tokio::test]
    async fn test_granted_app_page_runs_initial_refresh() {
        let fake = healthy_server();
        let mut app = app_with(&fake, Some("tok"));

        let outcome = app.load("/").await;

        match outcome {
            PageOutcome::App { identity, report } => {
                assert_eq!(identity.as_deref(), Some("ola@example.com"));
                assert!(report.is_clean());
                assert_eq!(report.refreshed.len(), 4);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // The probe precedes every view fetch
        assert_eq!(fake.targets()[0], format!("GET {}", ME_PATH));
        assert_eq!(
            reads_of(&fake),
            vec![
                "GET /api/categories",
                "GET /api/reports/balance",
                "GET /api/transactions",
                "GET /api/transactions?limit=5",
            ]
        );

        let views = app.views().unwrap();
        assert_eq!(views.balance.snapshot().await.data().unwrap().net.to_string(), "60.00");
    }

    #[tokio::test]
    async fn test_login_stores_token_then_redirects_to_app() {
        let fake = healthy_server();
        fake.respond("POST", LOGIN_PATH, StatusCode::OK, r#"{"access_token":"fresh","token_type":"bearer"}"#);
        let mut app = app_with(&fake, None);

        let outcome = app.load("/login").await;
        assert!(matches!(outcome, PageOutcome::AuthForm { .. }));
        assert!(fake.requests().is_empty());

        let next = app
            .login(&Credentials::new("ola@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(next, APP_ROUTE);
        assert_eq!(app.tokens().get(), Some("fresh".to_string()));

        let outcome = app.load(next).await;
        assert!(matches!(outcome, PageOutcome::App { .. }));
    }

    #[tokio::test]
    async fn test_login_page_with_valid_session_redirects_home() {
        let fake = healthy_server();
        let mut app = app_with(&fake, Some("tok"));

        let outcome = app.load("/login").await;
        assert!(matches!(outcome, PageOutcome::Redirect { to: APP_ROUTE }));
    }

    #[tokio::test]
    async fn test_login_validation_never_hits_network() {
        let fake = healthy_server();
        let mut app = app_with(&fake, None);

        let err = app.login(&Credentials::new("", "pw")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let fake = healthy_server();
        fake.respond("POST", REGISTER_PATH, StatusCode::CREATED, r#"{"id":1,"email":"new@example.com"}"#);
        fake.respond("POST", LOGIN_PATH, StatusCode::OK, r#"{"access_token":"t","token_type":"bearer"}"#);
        let mut app = app_with(&fake, None);

        let next = app
            .register(&Credentials::new("new@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(next, APP_ROUTE);
        assert_eq!(
            fake.targets(),
            vec![
                format!("POST {}", REGISTER_PATH),
                format!("POST {}", LOGIN_PATH)
            ]
        );
        assert_eq!(app.tokens().get(), Some("t".to_string()));
    }

    #[tokio::test]
    async fn test_callback_token_consumed_before_gate() {
        let fake = healthy_server();
        let mut app = app_with(&fake, None);

        let outcome = app.load("/?token=from-google").await;

        assert!(matches!(outcome, PageOutcome::App { .. }));
        assert_eq!(app.tokens().get(), Some("from-google".to_string()));
        assert_eq!(app.location().unwrap().to_string(), "/");
        assert_eq!(
            fake.requests()[0]
                .headers
                .get(reqwest::header::AUTHORIZATION)
                .unwrap(),
            "Bearer from-google"
        );
    }

    #[tokio::test]
    async fn test_delete_category_refreshes_categories_and_filtered_only() {
        let fake = healthy_server();
        fake.respond("DELETE", "/api/categories/4", StatusCode::NO_CONTENT, "");
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let report = app.delete_category(4).await.unwrap();

        let after: Vec<String> = fake.targets()[before..].to_vec();
        assert_eq!(after[0], "DELETE /api/categories/4");
        let mut reads = after[1..].to_vec();
        reads.sort();
        assert_eq!(reads, vec!["GET /api/categories", "GET /api/transactions"]);
        assert_eq!(report.touched(), vec![ViewName::Categories, ViewName::FilteredTransactions]);
    }

    #[tokio::test]
    async fn test_create_transaction_refreshes_after_write() {
        let fake = healthy_server();
        fake.respond(
            "POST",
            TRANSACTIONS_PATH,
            StatusCode::CREATED,
            r#"{"id":9,"type":"expense","amount":"5.00","date":"2024-03-02T10:00:00"}"#,
        );
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let (tx, report) = app
            .create_transaction(&TransactionForm::new(TxType::Expense, "5"))
            .await
            .unwrap();
        assert_eq!(tx.id, 9);

        let after = fake.targets()[before..].to_vec();
        assert_eq!(after[0], "POST /api/transactions");
        let mut reads = after[1..].to_vec();
        reads.sort();
        assert_eq!(
            reads,
            vec![
                "GET /api/reports/balance",
                "GET /api/transactions",
                "GET /api/transactions?limit=5",
            ]
        );
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_failed_write_triggers_no_refresh() {
        let fake = healthy_server();
        fake.respond(
            "POST",
            TRANSACTIONS_PATH,
            StatusCode::BAD_REQUEST,
            r#"{"detail":"Category does not exist"}"#,
        );
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let mut form = TransactionForm::new(TxType::Income, "10");
        form.category_id = Some(99);
        let err = app.create_transaction(&form).await.unwrap_err();

        assert_eq!(err.to_string(), "Server error (HTTP 400): Category does not exist");
        assert_eq!(fake.requests().len(), before + 1);
    }

    #[tokio::test]
    async fn test_missing_amount_is_validation_error() {
        let fake = healthy_server();
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let mut form = TransactionForm::new(TxType::Income, "");
        form.amount = None;
        let err = app.create_transaction(&form).await.unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(fake.requests().len(), before);
    }

    #[tokio::test]
    async fn test_data_cleared_resets_reports() {
        let fake = healthy_server();
        fake.respond(
            "POST",
            CLEAR_PATH,
            StatusCode::OK,
            r#"{"transactions_deleted":3,"categories_deleted":1}"#,
        );
        fake.respond(
            "GET",
            MONTHLY_REPORT_PATH,
            StatusCode::OK,
            r#"{"year":2024,"month":3,"income":"1","expense":"0","net":"1"}"#,
        );
        fake.respond("GET", CATEGORY_REPORT_PATH, StatusCode::OK, "[]");
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        app.load_monthly_report(None, None).await.unwrap();
        app.refresh_view(ViewName::CategoryReport).await.unwrap();

        let (summary, report) = app.clear_data().await.unwrap();

        assert_eq!(summary.transactions_deleted, 3);
        assert_eq!(report.reset, vec![ViewName::MonthlyReport, ViewName::CategoryReport]);
        let views = app.views().unwrap();
        assert_eq!(views.monthly.snapshot().await, ViewState::Empty);
        assert_eq!(views.by_category.snapshot().await, ViewState::Empty);
    }

    #[tokio::test]
    async fn test_refresh_failure_shows_inline_error_for_one_view() {
        let fake = healthy_server();
        fake.respond("GET", BALANCE_PATH, StatusCode::INTERNAL_SERVER_ERROR, "db down");
        let mut app = app_with(&fake, Some("tok"));

        let outcome = app.load("/").await;

        let PageOutcome::App { report, .. } = outcome else {
            panic!("expected app page");
        };
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.refreshed.len(), 3);
        let views = app.views().unwrap();
        assert!(views.balance.snapshot().await.error().is_some());
        assert!(views.categories.snapshot().await.error().is_none());
    }

    #[tokio::test]
    async fn test_apply_filter_reloads_filtered_list() {
        let fake = healthy_server();
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let criteria = FilterCriteria {
            tx_type: Some(TxType::Income),
            ..Default::default()
        };
        app.apply_filter(criteria).await.unwrap();

        assert_eq!(
            fake.targets()[before..].to_vec(),
            vec!["GET /api/transactions?type=income".to_string()]
        );
    }

    #[tokio::test]
    async fn test_actions_require_app_page() {
        let fake = healthy_server();
        let mut app = app_with(&fake, None);
        app.load("/login").await;

        let err = app.delete_transaction(1).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let fake = healthy_server();
        let mut app = app_with(&fake, Some("tok"));

        assert!(matches!(app.load("/").await, PageOutcome::App { .. }));

        assert_eq!(app.logout(), LOGIN_ROUTE);
        assert_eq!(app.tokens().get(), None);
        assert!(matches!(app.load("/").await, PageOutcome::Redirect { to: LOGIN_ROUTE }));
        assert!(app.views().is_none());
    }

    #[tokio::test]
    async fn test_probe_without_bearer_is_rejected() {
        let fake = healthy_server();
        let mut app = app_with(&fake, None);

        let err = app.api().me().await.unwrap_err();
        assert!(err.is_auth_invalid());
        assert!(matches!(app.load("/").await, PageOutcome::Redirect { to: LOGIN_ROUTE }));
    }

    #[tokio::test]
    async fn test_unauthorized_view_fetch_clears_token() {
        let fake = healthy_server();
        fake.respond("GET", BALANCE_PATH, StatusCode::UNAUTHORIZED, r#"{"detail":"Token expired"}"#);
        let mut app = app_with(&fake, Some("tok"));

        let PageOutcome::App { report, .. } = app.load("/").await else {
            panic!("expected app page");
        };

        assert_eq!(report.failed, vec![(ViewName::Balance, ApiError::AuthInvalid { status: 401 })]);
        assert_eq!(app.tokens().get(), None);
        // Inline error only; the rest of the page still rendered
        let views = app.views().unwrap();
        assert!(views.balance.snapshot().await.error().is_some());
        assert!(views.categories.snapshot().await.data().is_some());
        // The next page load is sent to the login page
        assert!(matches!(app.load("/").await, PageOutcome::Redirect { to: LOGIN_ROUTE }));
    }

    #[tokio::test]
    async fn test_seed_demo_refreshes_initial_views() {
        let fake = healthy_server();
        fake.respond(
            "POST",
            SEED_DEMO_PATH,
            StatusCode::OK,
            r#"{"categories_created":4,"transactions_created":12}"#,
        );
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let (summary, report) = app.seed_demo().await.unwrap();

        assert_eq!(summary.transactions_created, 12);
        let after = fake.targets()[before..].to_vec();
        assert_eq!(after[0], "POST /api/debug/seed-demo");
        let mut reads = after[1..].to_vec();
        reads.sort();
        assert_eq!(
            reads,
            vec![
                "GET /api/categories",
                "GET /api/reports/balance",
                "GET /api/transactions",
                "GET /api/transactions?limit=5",
            ]
        );
        assert_eq!(
            report.touched(),
            vec![
                ViewName::Balance,
                ViewName::RecentTransactions,
                ViewName::Categories,
                ViewName::FilteredTransactions,
            ]
        );
    }

    #[tokio::test]
    async fn test_update_transaction_refreshes_transaction_views() {
        let fake = healthy_server();
        fake.respond(
            "PUT",
            "/api/transactions/1",
            StatusCode::OK,
            r#"{"id":1,"type":"income","amount":"120.00","date":"2024-03-01T09:00:00"}"#,
        );
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let form = TransactionEditForm {
            amount: Some("120".to_string()),
            ..Default::default()
        };
        let (tx, report) = app.update_transaction(1, &form).await.unwrap();

        assert_eq!(tx.amount.to_string(), "120.00");
        assert_eq!(fake.targets()[before], "PUT /api/transactions/1");
        assert_eq!(
            report.touched(),
            vec![
                ViewName::Balance,
                ViewName::RecentTransactions,
                ViewName::FilteredTransactions,
            ]
        );
    }

    #[tokio::test]
    async fn test_update_category_refreshes_category_views() {
        let fake = healthy_server();
        fake.respond(
            "PUT",
            "/api/categories/4",
            StatusCode::OK,
            r##"{"id":4,"name":"Groceries","color":"#00ff00"}"##,
        );
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let form = CategoryEditForm {
            name: Some("Groceries".to_string()),
            color: Some("#00ff00".to_string()),
        };
        let (category, report) = app.update_category(4, &form).await.unwrap();

        assert_eq!(category.name, "Groceries");
        assert_eq!(fake.targets()[before], "PUT /api/categories/4");
        assert_eq!(report.touched(), vec![ViewName::Categories, ViewName::FilteredTransactions]);
    }

    #[tokio::test]
    async fn test_empty_edit_never_hits_network() {
        let fake = healthy_server();
        let mut app = app_with(&fake, Some("tok"));
        app.load("/").await;
        let before = fake.requests().len();

        let err = app
            .update_category(4, &CategoryEditForm::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(fake.requests().len(), before);
    }

    #[test]
    fn test_google_login_url() {
        let fake = Arc::new(FakeTransport::new());
        let app = app_with(&fake, None);
        assert_eq!(
            app.google_login_url(),
            "http://127.0.0.1:8000/api/auth/google/login"
        );
    }
}
