//! Views and the per-page view registry.
//!
//! A view is a no-argument fetch-and-store unit. It keeps the last result it
//! received (data or an inline error message); rendering is left to the
//! front end, which reads snapshots.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::RwLock;

use crate::api::{ApiError, FinanceApi};
use crate::filter::{FilterCriteria, FilterQueryBuilder};
use crate::models::{Balance, Category, CategoryReportRow, MonthlyReport, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewName {
    Balance,
    RecentTransactions,
    Categories,
    FilteredTransactions,
    MonthlyReport,
    CategoryReport,
}

impl ViewName {
    pub fn title(&self) -> &'static str {
        match self {
            ViewName::Balance => "Balance",
            ViewName::RecentTransactions => "Recent transactions",
            ViewName::Categories => "Categories",
            ViewName::FilteredTransactions => "Transactions",
            ViewName::MonthlyReport => "Monthly report",
            ViewName::CategoryReport => "Report by category",
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[async_trait]
pub trait View: Send + Sync {
    /// Fetch fresh data and store it. On failure the previous content is kept.
    async fn refresh(&self) -> Result<(), ApiError>;

    /// Drop any content, back to the never-loaded state.
    async fn reset(&self);

    /// Record an inline error for this view only.
    async fn show_error(&self, message: String);
}

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Empty,
    Loaded(T),
    /// Last refresh failed; `stale` is whatever was loaded before
    Failed { message: String, stale: Option<T> },
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Empty
    }
}

impl<T> ViewState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(data) => Some(data),
            ViewState::Failed { stale, .. } => stale.as_ref(),
            ViewState::Empty => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

type Fetcher<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

/// Generic view over one fetch function.
///
/// Overlapping refreshes are not serialized: whichever response resolves last is stored.
pub struct DataView<T> {
    fetch: Fetcher<T>,
    state: RwLock<ViewState<T>>,
}

impl<T: Clone + Send + Sync + 'static> DataView<T> {
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync + 'static,
    {
        Self {
            fetch: Box::new(fetch),
            state: RwLock::new(ViewState::Empty),
        }
    }

    pub async fn snapshot(&self) -> ViewState<T> {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> View for DataView<T> {
    async fn refresh(&self) -> Result<(), ApiError> {
        let data = (self.fetch)().await?;
        *self.state.write().await = ViewState::Loaded(data);
        Ok(())
    }

    async fn reset(&self) {
        *self.state.write().await = ViewState::Empty;
    }

    async fn show_error(&self, message: String) {
        let mut state = self.state.write().await;
        let stale = match std::mem::take(&mut *state) {
            ViewState::Loaded(data) => Some(data),
            ViewState::Failed { stale, .. } => stale,
            ViewState::Empty => None,
        };
        *state = ViewState::Failed { message, stale };
    }
}

/// Mapping from view name to its refresh capability, built once per page.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    views: HashMap<ViewName, Arc<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: ViewName, view: Arc<dyn View>) {
        self.views.insert(name, view);
    }

    pub fn get(&self, name: ViewName) -> Option<&Arc<dyn View>> {
        self.views.get(&name)
    }

    pub fn contains(&self, name: ViewName) -> bool {
        self.views.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Report parameters for the monthly view; `None` means the current month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthSelection {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// The concrete views of the main app page, with typed handles for rendering.
pub struct PageViews {
    pub balance: Arc<DataView<Balance>>,
    pub recent: Arc<DataView<Vec<Transaction>>>,
    pub categories: Arc<DataView<Vec<Category>>>,
    pub filtered: Arc<DataView<Vec<Transaction>>>,
    pub monthly: Arc<DataView<MonthlyReport>>,
    pub by_category: Arc<DataView<Vec<CategoryReportRow>>>,
    pub filter: Arc<RwLock<FilterCriteria>>,
    pub month: Arc<RwLock<MonthSelection>>,
}

impl PageViews {
    pub fn new(api: &FinanceApi, recent_limit: u32) -> Self {
        let filter = Arc::new(RwLock::new(FilterCriteria::default()));
        let month = Arc::new(RwLock::new(MonthSelection::default()));

        let balance = {
            let api = api.clone();
            DataView::new(move || {
                let api = api.clone();
                async move { api.balance().await }.boxed()
            })
        };

        let recent = {
            let api = api.clone();
            let query = FilterQueryBuilder::build(&FilterCriteria::limited(recent_limit));
            DataView::new(move || {
                let api = api.clone();
                let query = query.clone();
                async move { api.transactions(query).await }.boxed()
            })
        };

        let categories = {
            let api = api.clone();
            DataView::new(move || {
                let api = api.clone();
                async move { api.categories().await }.boxed()
            })
        };

        let filtered = {
            let api = api.clone();
            let filter = Arc::clone(&filter);
            DataView::new(move || {
                let api = api.clone();
                let filter = Arc::clone(&filter);
                async move {
                    let query = FilterQueryBuilder::build(&*filter.read().await);
                    api.transactions(query).await
                }
                .boxed()
            })
        };

        let monthly = {
            let api = api.clone();
            let month = Arc::clone(&month);
            DataView::new(move || {
                let api = api.clone();
                let month = Arc::clone(&month);
                async move {
                    let selection = *month.read().await;
                    api.monthly_report(selection.year, selection.month).await
                }
                .boxed()
            })
        };

        let by_category = {
            let api = api.clone();
            DataView::new(move || {
                let api = api.clone();
                async move { api.category_report().await }.boxed()
            })
        };

        Self {
            balance: Arc::new(balance),
            recent: Arc::new(recent),
            categories: Arc::new(categories),
            filtered: Arc::new(filtered),
            monthly: Arc::new(monthly),
            by_category: Arc::new(by_category),
            filter,
            month,
        }
    }

    pub fn registry(&self) -> ViewRegistry {
        let mut registry = ViewRegistry::new();
        registry.register(ViewName::Balance, self.balance.clone());
        registry.register(ViewName::RecentTransactions, self.recent.clone());
        registry.register(ViewName::Categories, self.categories.clone());
        registry.register(ViewName::FilteredTransactions, self.filtered.clone());
        registry.register(ViewName::MonthlyReport, self.monthly.clone());
        registry.register(ViewName::CategoryReport, self.by_category.clone());
        registry
    }
}
