//! Cross-view consistency after page load and after every mutation.
//!
//! Each `MutationEvent` maps to a fixed set of view actions. The actions of
//! one batch run concurrently and independently: a failing view gets an
//! inline error and never blocks or fails its siblings.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::auth::TokenStore;
use crate::views::{ViewName, ViewRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationEvent {
    TransactionCreated,
    TransactionUpdated,
    TransactionDeleted,
    CategoryCreated,
    CategoryUpdated,
    CategoryDeleted,
    DataCleared,
    DemoSeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Refresh(ViewName),
    Reset(ViewName),
}

impl ViewAction {
    pub fn view(&self) -> ViewName {
        match self {
            ViewAction::Refresh(name) | ViewAction::Reset(name) => *name,
        }
    }
}

use ViewAction::{Refresh, Reset};
use ViewName::{
    Balance, Categories, CategoryReport, FilteredTransactions, MonthlyReport, RecentTransactions,
};

const INITIAL_PLAN: &[ViewAction] = &[
    Refresh(Balance),
    Refresh(RecentTransactions),
    Refresh(Categories),
    Refresh(FilteredTransactions),
];

const TRANSACTION_PLAN: &[ViewAction] = &[
    Refresh(Balance),
    Refresh(RecentTransactions),
    Refresh(FilteredTransactions),
];

const CATEGORY_PLAN: &[ViewAction] = &[Refresh(Categories), Refresh(FilteredTransactions)];

const CLEARED_PLAN: &[ViewAction] = &[
    Refresh(Balance),
    Refresh(RecentTransactions),
    Refresh(Categories),
    Refresh(FilteredTransactions),
    Reset(MonthlyReport),
    Reset(CategoryReport),
];

impl MutationEvent {
    /// Views to act on once this mutation has been written.
    pub fn plan(&self) -> &'static [ViewAction] {
        match self {
            MutationEvent::TransactionCreated
            | MutationEvent::TransactionUpdated
            | MutationEvent::TransactionDeleted => TRANSACTION_PLAN,
            MutationEvent::CategoryCreated
            | MutationEvent::CategoryUpdated
            | MutationEvent::CategoryDeleted => CATEGORY_PLAN,
            MutationEvent::DataCleared => CLEARED_PLAN,
            MutationEvent::DemoSeeded => INITIAL_PLAN,
        }
    }
}

#[derive(Debug)]
enum Outcome {
    Refreshed,
    Reset,
    Failed(ApiError),
    Skipped,
}

/// What happened to each view in one batch.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<ViewName>,
    pub reset: Vec<ViewName>,
    pub failed: Vec<(ViewName, ApiError)>,
    /// Planned but not registered on this page
    pub skipped: Vec<ViewName>,
}

impl RefreshReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn touched(&self) -> Vec<ViewName> {
        let mut all: Vec<ViewName> = self
            .refreshed
            .iter()
            .chain(self.reset.iter())
            .copied()
            .chain(self.failed.iter().map(|(name, _)| *name))
            .collect();
        all.sort();
        all
    }
}

pub struct ViewRefreshCoordinator {
    registry: ViewRegistry,
    tokens: Option<Arc<TokenStore>>,
}

impl ViewRefreshCoordinator {
    pub fn new(registry: ViewRegistry) -> Self {
        Self {
            registry,
            tokens: None,
        }
    }

    /// Clear this store whenever a view fetch is rejected as unauthorized.
    pub fn with_token_store(mut self, tokens: Arc<TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn registry(&self) -> &ViewRegistry {
        &self.registry
    }

    /// Full refresh after the gate grants the page.
    pub async fn initial(&self) -> RefreshReport {
        info!("Initial refresh");
        self.run(INITIAL_PLAN).await
    }

    /// Refresh the views affected by an already-completed mutation.
    pub async fn after(&self, event: MutationEvent) -> RefreshReport {
        info!(?event, "Refreshing after mutation");
        self.run(event.plan()).await
    }

    /// Explicit reload of a single view (refresh button, new filter, report request).
    pub async fn refresh_view(&self, name: ViewName) -> RefreshReport {
        self.run(&[ViewAction::Refresh(name)]).await
    }

    /// Run `write` to completion; only if it succeeds, refresh the views for `event`.
    ///
    /// A failed write returns its error and triggers no refresh.
    pub async fn commit<T, F>(&self, event: MutationEvent, write: F) -> Result<(T, RefreshReport), ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let value = match write.await {
            Ok(value) => value,
            Err(e) => {
                warn!(?event, error = %e, "Mutation failed, views left unchanged");
                return Err(e);
            }
        };
        let report = self.after(event).await;
        Ok((value, report))
    }

    async fn run(&self, plan: &[ViewAction]) -> RefreshReport {
        let outcomes = join_all(plan.iter().map(|action| self.perform(*action))).await;

        let mut report = RefreshReport::default();
        for (action, outcome) in plan.iter().zip(outcomes) {
            let name = action.view();
            match outcome {
                Outcome::Refreshed => report.refreshed.push(name),
                Outcome::Reset => report.reset.push(name),
                Outcome::Failed(e) => report.failed.push((name, e)),
                Outcome::Skipped => report.skipped.push(name),
            }
        }
        debug!(
            refreshed = report.refreshed.len(),
            reset = report.reset.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "Refresh batch complete"
        );
        report
    }

    async fn perform(&self, action: ViewAction) -> Outcome {
        let Some(view) = self.registry.get(action.view()) else {
            debug!(view = ?action.view(), "View not present on this page, skipping");
            return Outcome::Skipped;
        };

        match action {
            ViewAction::Reset(_) => {
                view.reset().await;
                Outcome::Reset
            }
            ViewAction::Refresh(name) => match view.refresh().await {
                Ok(()) => Outcome::Refreshed,
                Err(e) => {
                    warn!(view = ?name, error = %e, "View refresh failed");
                    if e.is_auth_invalid() {
                        if let Some(tokens) = &self.tokens {
                            info!(view = ?name, "Credential rejected, clearing stored token");
                            tokens.clear();
                        }
                    }
                    view.show_error(e.to_string()).await;
                    Outcome::Failed(e)
                }
            },
        }
    }
}
