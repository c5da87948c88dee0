use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use budgetpad_core::models::TxType;

#[derive(Parser)]
#[command(name = "budgetpad", version, about = "Personal budget planner client")]
pub(crate) struct Cli {
    /// API base URL (overrides config and BUDGETPAD_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Load a page and show it (default: the main page)
    Open {
        #[arg(default_value = "/")]
        url: String,
    },
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    Register {
        #[arg(long)]
        email: Option<String>,
    },
    Logout,
    /// Print the URL that starts Google sign-in
    GoogleLogin,
    /// Add a transaction
    Add {
        #[arg(long = "type", value_parser = parse_tx_type)]
        tx_type: TxType,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        /// Local date, defaults to now
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        planned: bool,
    },
    /// Change fields of a transaction; omitted fields stay as they are
    EditTx {
        id: i64,
        #[arg(long = "type", value_parser = parse_tx_type)]
        tx_type: Option<TxType>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        planned: Option<bool>,
    },
    DeleteTx {
        id: i64,
    },
    AddCategory {
        name: String,
        #[arg(long)]
        color: Option<String>,
    },
    EditCategory {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    DeleteCategory {
        id: i64,
    },
    /// Delete all of your transactions and categories
    Clear {
        #[arg(long)]
        yes: bool,
    },
    SeedDemo,
    /// List transactions matching a filter
    Filter {
        #[arg(long = "type", value_parser = parse_tx_type)]
        tx_type: Option<TxType>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand)]
pub(crate) enum ReportCommand {
    Monthly {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    ByCategory,
}

fn parse_tx_type(raw: &str) -> Result<TxType, String> {
    raw.parse()
}
