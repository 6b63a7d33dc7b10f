//! CLI command handlers
//!
//! Bridges the clap argument definitions with the ledger service. Each
//! handler is generic over the storage backend so the same code runs
//! against the JSON files and against in-memory storage in tests.

pub mod category;
pub mod export;
pub mod report;
pub mod template;
pub mod transaction;

pub use category::{handle_category_command, CategoryCommands};
pub use export::{handle_export_command, ExportCommands};
pub use report::{handle_budget_command, handle_forecast_command, BudgetArgs, ForecastArgs};
pub use template::{handle_template_command, TemplateCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;

use crate::error::{SaveError, SaveResult};
use crate::models::{Currency, Money};

/// Parse a `YYYY-MM-DD` argument
pub(crate) fn parse_date(value: &str) -> SaveResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SaveError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD format.", value))
    })
}

/// Parse an optional date argument, defaulting to today
pub(crate) fn date_or_today(value: Option<&str>) -> SaveResult<NaiveDate> {
    match value {
        Some(value) => parse_date(value),
        None => Ok(today()),
    }
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a major-unit amount such as "-12.50" in `currency`
pub(crate) fn parse_amount(value: &str, currency: Currency) -> SaveResult<Money> {
    Money::parse(value, currency)
}
