//! Plain-text rendering of view snapshots.

use std::fmt::Write;

use budgetpad_core::coordinator::RefreshReport;
use budgetpad_core::models::{Balance, Category, CategoryReportRow, MonthlyReport, Transaction};
use budgetpad_core::views::{PageViews, ViewName, ViewState};

const DESCRIPTION_WIDTH: usize = 30;

/// Truncate a string to a maximum length, adding ellipsis if needed
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Section header, the view body, and an inline error line if the last refresh failed.
fn section<T>(name: ViewName, state: &ViewState<T>, body: impl Fn(&T) -> String) -> String {
    let mut out = format!("== {} ==\n", name.title());
    match state.data() {
        Some(data) => out.push_str(&body(data)),
        None if state.error().is_none() => out.push_str("  (not loaded)\n"),
        None => {}
    }
    if let Some(message) = state.error() {
        let _ = writeln!(out, "  ! {}", message);
    }
    out
}

pub fn balance(balance: &Balance) -> String {
    let marker = if balance.is_negative() { " (over budget)" } else { "" };
    format!(
        "  Income:  {}\n  Expense: {}\n  Net:     {}{}\n",
        balance.income, balance.expense, balance.net, marker
    )
}

pub fn transactions(list: &[Transaction]) -> String {
    if list.is_empty() {
        return "  No transactions\n".to_string();
    }
    let mut out = String::new();
    for tx in list {
        let planned = if tx.is_planned { " [planned]" } else { "" };
        let _ = writeln!(
            out,
            "  #{:<5} {}  {:>12}  {}{}",
            tx.id,
            tx.date.format("%Y-%m-%d"),
            tx.signed_amount(),
            truncate(tx.description.as_deref().unwrap_or("-"), DESCRIPTION_WIDTH),
            planned
        );
    }
    out
}

pub fn categories(list: &[Category]) -> String {
    if list.is_empty() {
        return "  No categories\n".to_string();
    }
    list.iter()
        .map(|c| match &c.color {
            Some(color) => format!("  #{:<5} {} ({})\n", c.id, c.name, color),
            None => format!("  #{:<5} {}\n", c.id, c.name),
        })
        .collect()
}

pub fn monthly(report: &MonthlyReport) -> String {
    format!(
        "  {}-{:02}: income {}, expense {}, net {}\n",
        report.year, report.month, report.income, report.expense, report.net
    )
}

pub fn by_category(rows: &[CategoryReportRow]) -> String {
    if rows.is_empty() {
        return "  No data\n".to_string();
    }
    rows.iter()
        .map(|r| {
            format!(
                "  {:<20} income {:>10}  expense {:>10}  total {:>10}\n",
                truncate(&r.category_name, 20),
                r.income,
                r.expense,
                r.total
            )
        })
        .collect()
}

/// The main page: balance, recent transactions, categories and the filtered list.
pub async fn page(views: &PageViews) -> String {
    [
        section(ViewName::Balance, &views.balance.snapshot().await, balance),
        section(
            ViewName::RecentTransactions,
            &views.recent.snapshot().await,
            |l| transactions(l),
        ),
        section(ViewName::Categories, &views.categories.snapshot().await, |l| {
            categories(l)
        }),
        section(
            ViewName::FilteredTransactions,
            &views.filtered.snapshot().await,
            |l| transactions(l),
        ),
    ]
    .join("\n")
}

pub async fn view(views: &PageViews, name: ViewName) -> String {
    match name {
        ViewName::Balance => section(name, &views.balance.snapshot().await, balance),
        ViewName::RecentTransactions => {
            section(name, &views.recent.snapshot().await, |l| transactions(l))
        }
        ViewName::Categories => section(name, &views.categories.snapshot().await, |l| categories(l)),
        ViewName::FilteredTransactions => {
            section(name, &views.filtered.snapshot().await, |l| transactions(l))
        }
        ViewName::MonthlyReport => section(name, &views.monthly.snapshot().await, monthly),
        ViewName::CategoryReport => {
            section(name, &views.by_category.snapshot().await, |r| by_category(r))
        }
    }
}

/// Hint line when any view failed because the session is no longer valid.
pub fn auth_hint(report: &RefreshReport) -> Option<&'static str> {
    report
        .failed
        .iter()
        .any(|(_, e)| e.is_auth_invalid())
        .then_some("Your session has expired. Run `budgetpad login` to sign in again.")
}
