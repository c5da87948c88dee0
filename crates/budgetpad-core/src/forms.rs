//! Client-side validation of user input before anything reaches the network.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::api::ApiError;
use crate::models::{CategoryUpdate, NewCategory, NewTransaction, TransactionUpdate, TxType};

/// Server-side column limits
const MAX_CATEGORY_NAME_LENGTH: usize = 100;
const MAX_COLOR_LENGTH: usize = 32;
const MAX_DESCRIPTION_LENGTH: usize = 255;
const MAX_AMOUNT_SCALE: u32 = 2;

fn invalid(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

/// Non-blank, trimmed text or `None`
fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Positive amount with at most two decimal places; `,` works as the separator.
fn parse_amount(raw: &str) -> Result<Decimal, ApiError> {
    let amount = Decimal::from_str(&raw.replace(',', "."))
        .map_err(|_| ApiError::Validation(format!("Amount is not a number: {}", raw)))?;
    if amount <= Decimal::ZERO {
        return Err(invalid("Amount must be greater than zero"));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(invalid("Amount can have at most 2 decimal places"));
    }
    Ok(amount)
}

fn check_description(description: &Option<String>) -> Result<(), ApiError> {
    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
    {
        return Err(invalid("Description is too long"));
    }
    Ok(())
}

fn check_category_name(name: &str) -> Result<(), ApiError> {
    if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
        return Err(invalid("Category name is too long"));
    }
    Ok(())
}

fn check_color(color: &Option<String>) -> Result<(), ApiError> {
    if color.as_ref().is_some_and(|c| c.len() > MAX_COLOR_LENGTH) {
        return Err(invalid("Color is too long"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionForm {
    pub tx_type: TxType,
    /// Raw amount as typed; a comma decimal separator is accepted
    pub amount: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
    pub is_planned: bool,
}

impl TransactionForm {
    pub fn new(tx_type: TxType, amount: impl Into<String>) -> Self {
        Self {
            tx_type,
            amount: Some(amount.into()),
            category_id: None,
            description: None,
            date: None,
            is_planned: false,
        }
    }

    pub fn validate(&self) -> Result<NewTransaction, ApiError> {
        let raw = non_blank(self.amount.as_deref()).ok_or_else(|| invalid("Amount is required"))?;
        let amount = parse_amount(&raw)?;

        let description = non_blank(self.description.as_deref());
        check_description(&description)?;

        Ok(NewTransaction {
            category_id: self.category_id,
            tx_type: self.tx_type,
            amount,
            description,
            date: self.date.unwrap_or_else(Utc::now),
            is_planned: self.is_planned,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    pub color: Option<String>,
}

impl CategoryForm {
    pub fn validate(&self) -> Result<NewCategory, ApiError> {
        let name = non_blank(Some(&self.name)).ok_or_else(|| invalid("Category name is required"))?;
        check_category_name(&name)?;
        let color = non_blank(self.color.as_deref());
        check_color(&color)?;
        Ok(NewCategory { name, color })
    }
}

/// Edit of an existing transaction. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionEditForm {
    pub tx_type: Option<TxType>,
    pub amount: Option<String>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub is_planned: Option<bool>,
}

impl TransactionEditForm {
    pub fn validate(&self) -> Result<TransactionUpdate, ApiError> {
        let amount = match self.amount.as_deref() {
            Some(raw) => {
                let raw = non_blank(Some(raw)).ok_or_else(|| invalid("Amount is required"))?;
                Some(parse_amount(&raw)?)
            }
            None => None,
        };
        let description = non_blank(self.description.as_deref());
        check_description(&description)?;

        let update = TransactionUpdate {
            category_id: self.category_id,
            tx_type: self.tx_type,
            amount,
            description,
            date: self.date,
            is_planned: self.is_planned,
        };
        if update.is_empty() {
            return Err(invalid("Nothing to update"));
        }
        Ok(update)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryEditForm {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CategoryEditForm {
    pub fn validate(&self) -> Result<CategoryUpdate, ApiError> {
        let name = match self.name.as_deref() {
            Some(raw) => {
                let name = non_blank(Some(raw)).ok_or_else(|| invalid("Category name is required"))?;
                check_category_name(&name)?;
                Some(name)
            }
            None => None,
        };
        let color = non_blank(self.color.as_deref());
        check_color(&color)?;

        let update = CategoryUpdate { name, color };
        if update == CategoryUpdate::default() {
            return Err(invalid("Nothing to update"));
        }
        Ok(update)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Email is trimmed and lowercased; the password is taken as-is.
    pub fn validate(&self) -> Result<Credentials, ApiError> {
        let email = non_blank(Some(&self.email)).ok_or_else(|| invalid("Email is required"))?;
        if self.password.is_empty() {
            return Err(invalid("Password is required"));
        }
        Ok(Credentials {
            email: email.to_lowercase(),
            password: self.password.clone(),
        })
    }
}
