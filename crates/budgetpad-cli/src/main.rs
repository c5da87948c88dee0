//! budgetpad - command line client for the budget planner API.
//!
//! Every invocation is one page load: the stored token is checked against the
//! server before anything on the main page is fetched or changed.

mod commands;
mod render;

use std::io::{self, Write};

use anyhow::{bail, Result};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use budgetpad_core::auth::{APP_ROUTE, LOGIN_ROUTE, REGISTER_ROUTE};
use budgetpad_core::coordinator::RefreshReport;
use budgetpad_core::filter::{start_of_day, FilterCriteria};
use budgetpad_core::forms::{
    CategoryEditForm, CategoryForm, Credentials, TransactionEditForm, TransactionForm,
};
use budgetpad_core::views::ViewName;
use budgetpad_core::{App, Config, PageOutcome};

use commands::{Cli, Command, ReportCommand};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::load_with_env();
    if let Some(url) = cli.api_url {
        config.api_base_url = Some(url);
    }
    info!(api = config.api_base_url(), "budgetpad starting");

    let mut app = App::new(config)?;
    run(&mut app, cli.command.unwrap_or(Command::Open { url: APP_ROUTE.to_string() })).await
}

async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Open { url } => {
            let outcome = app.load(&url).await;
            show_outcome(app, outcome).await;
        }
        Command::Login { email } => {
            if !auth_page(app, LOGIN_ROUTE).await {
                return Ok(());
            }
            let credentials = prompt_credentials(email.or_else(|| app.config.last_email.clone()))?;
            let next = app.login(&credentials).await?;
            remember_email(app);
            println!("Logged in.");
            let outcome = app.load(next).await;
            show_outcome(app, outcome).await;
        }
        Command::Register { email } => {
            if !auth_page(app, REGISTER_ROUTE).await {
                return Ok(());
            }
            let credentials = prompt_credentials(email)?;
            let next = app.register(&credentials).await?;
            remember_email(app);
            println!("Account created.");
            let outcome = app.load(next).await;
            show_outcome(app, outcome).await;
        }
        Command::Logout => {
            app.logout();
            println!("Logged out.");
        }
        Command::GoogleLogin => {
            println!("Open this URL in a browser to sign in with Google:");
            println!("  {}", app.google_login_url());
            println!("Then run `budgetpad open '<callback url>'` with the URL you are sent back to.");
        }
        Command::Add {
            tx_type,
            amount,
            category,
            description,
            date,
            planned,
        } => {
            if !main_page(app).await {
                return Ok(());
            }
            let form = TransactionForm {
                tx_type,
                amount: Some(amount),
                category_id: category,
                description,
                date: date.map(|d| start_of_day(&Local, d)),
                is_planned: planned,
            };
            let (tx, report) = app.create_transaction(&form).await?;
            println!("Added transaction #{} ({}).", tx.id, tx.signed_amount());
            show_page(app, &report).await;
        }
        Command::EditTx {
            id,
            tx_type,
            amount,
            category,
            description,
            date,
            planned,
        } => {
            if !main_page(app).await {
                return Ok(());
            }
            let form = TransactionEditForm {
                tx_type,
                amount,
                category_id: category,
                description,
                date: date.map(|d| start_of_day(&Local, d)),
                is_planned: planned,
            };
            let (tx, report) = app.update_transaction(id, &form).await?;
            println!("Updated transaction #{} ({}).", tx.id, tx.signed_amount());
            show_page(app, &report).await;
        }
        Command::DeleteTx { id } => {
            if !main_page(app).await {
                return Ok(());
            }
            let report = app.delete_transaction(id).await?;
            println!("Deleted transaction #{}.", id);
            show_page(app, &report).await;
        }
        Command::AddCategory { name, color } => {
            if !main_page(app).await {
                return Ok(());
            }
            let (category, report) = app.create_category(&CategoryForm { name, color }).await?;
            println!("Added category #{} {}.", category.id, category.name);
            show_page(app, &report).await;
        }
        Command::EditCategory { id, name, color } => {
            if !main_page(app).await {
                return Ok(());
            }
            let (category, report) = app
                .update_category(id, &CategoryEditForm { name, color })
                .await?;
            println!("Updated category #{} {}.", category.id, category.name);
            show_page(app, &report).await;
        }
        Command::DeleteCategory { id } => {
            if !main_page(app).await {
                return Ok(());
            }
            let report = app.delete_category(id).await?;
            println!("Deleted category #{}.", id);
            show_page(app, &report).await;
        }
        Command::Clear { yes } => {
            if !yes && !confirm("Delete ALL your transactions and categories?")? {
                println!("Cancelled.");
                return Ok(());
            }
            if !main_page(app).await {
                return Ok(());
            }
            let (summary, report) = app.clear_data().await?;
            println!(
                "Removed {} transactions and {} categories.",
                summary.transactions_deleted, summary.categories_deleted
            );
            show_page(app, &report).await;
        }
        Command::SeedDemo => {
            if !main_page(app).await {
                return Ok(());
            }
            let (summary, report) = app.seed_demo().await?;
            println!(
                "Created {} categories and {} transactions.",
                summary.categories_created, summary.transactions_created
            );
            show_page(app, &report).await;
        }
        Command::Filter {
            tx_type,
            category,
            from,
            to,
            q,
            limit,
        } => {
            if !main_page(app).await {
                return Ok(());
            }
            let criteria = FilterCriteria {
                tx_type,
                category_id: category,
                date_from: from,
                date_to: to,
                query: None,
                limit,
            }
            .with_query(q);
            let report = app.apply_filter(criteria).await?;
            show_view(app, ViewName::FilteredTransactions, &report).await;
        }
        Command::Report(ReportCommand::Monthly { year, month }) => {
            if !main_page(app).await {
                return Ok(());
            }
            let report = app.load_monthly_report(year, month).await?;
            show_view(app, ViewName::MonthlyReport, &report).await;
        }
        Command::Report(ReportCommand::ByCategory) => {
            if !main_page(app).await {
                return Ok(());
            }
            let report = app.refresh_view(ViewName::CategoryReport).await?;
            show_view(app, ViewName::CategoryReport, &report).await;
        }
    }
    Ok(())
}

/// Load the main page quietly. False (with a message) if the gate redirected.
async fn main_page(app: &mut App) -> bool {
    match app.load(APP_ROUTE).await {
        PageOutcome::App { report, .. } => {
            if let Some(hint) = render::auth_hint(&report) {
                eprintln!("{}", hint);
            }
            true
        }
        PageOutcome::Redirect { .. } => {
            eprintln!("Not logged in. Run `budgetpad login` first.");
            false
        }
        _ => false,
    }
}

/// Load an auth page. False (with a message) if a valid session sends us home.
async fn auth_page(app: &mut App, route: &str) -> bool {
    match app.load(route).await {
        PageOutcome::Redirect { to } if to == APP_ROUTE => {
            println!("Already logged in{}.", identity_suffix(app));
            false
        }
        _ => true,
    }
}

async fn show_outcome(app: &App, outcome: PageOutcome) {
    match outcome {
        PageOutcome::Redirect { to } => {
            println!("Redirected to {}.", to);
            if to == LOGIN_ROUTE {
                println!("Run `budgetpad login` to sign in.");
            }
        }
        PageOutcome::App { report, .. } => {
            println!("Signed in{}\n", identity_suffix(app));
            show_page(app, &report).await;
        }
        PageOutcome::AuthForm { location } => {
            println!("{}: use `budgetpad login` or `budgetpad register`.", location);
        }
        PageOutcome::Other { location } => {
            println!("Nothing to show at {}.", location);
        }
    }
}

async fn show_page(app: &App, report: &RefreshReport) {
    if let Some(views) = app.views() {
        println!("{}", render::page(views).await);
    }
    if let Some(hint) = render::auth_hint(report) {
        eprintln!("{}", hint);
    }
}

async fn show_view(app: &App, name: ViewName, report: &RefreshReport) {
    if let Some(views) = app.views() {
        print!("{}", render::view(views, name).await);
    }
    if let Some(hint) = render::auth_hint(report) {
        eprintln!("{}", hint);
    }
}

fn identity_suffix(app: &App) -> String {
    app.identity()
        .map(|email| format!(" as {}", email))
        .unwrap_or_default()
}

fn remember_email(app: &App) {
    if let Err(e) = app.config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

fn prompt_credentials(email: Option<String>) -> Result<Credentials> {
    let email = match email {
        Some(email) => email,
        None => {
            print!("Email: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    if email.is_empty() {
        bail!("Email is required");
    }
    let password = rpassword::prompt_password("Password: ")?;
    Ok(Credentials::new(email, password))
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
