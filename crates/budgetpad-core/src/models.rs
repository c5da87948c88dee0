//! Wire types for the budget planner API.
//!
//! Money amounts travel as decimal strings and are held as `rust_decimal::Decimal`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        }
    }

    /// Sign prefix used when displaying an amount
    pub fn sign(&self) -> char {
        match self {
            TxType::Income => '+',
            TxType::Expense => '-',
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxType::Income),
            "expense" => Ok(TxType::Expense),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_datetime")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_planned: bool,
}

impl Transaction {
    /// Amount with its sign, e.g. `+12.50` or `-3.00`
    pub fn signed_amount(&self) -> String {
        format!("{}{}", self.tx_type.sign(), self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub category_id: Option<i64>,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub is_planned: bool,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<TxType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_planned: Option<bool>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

impl Balance {
    pub fn is_negative(&self) -> bool {
        self.net.is_sign_negative() && !self.net.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReportRow {
    #[serde(default)]
    pub category_id: Option<i64>,
    pub category_name: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub total: Decimal,
}

/// Identity returned by `/api/auth/me`; other user fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClearSummary {
    pub transactions_deleted: u64,
    pub categories_deleted: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedSummary {
    pub categories_created: u64,
    pub transactions_created: u64,
}

/// Accept RFC 3339 timestamps as well as naive ISO timestamps (treated as UTC).
fn deserialize_flexible_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_datetime(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {}", raw)))
}

pub fn parse_flexible_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
