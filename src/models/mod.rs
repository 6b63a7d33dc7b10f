//! Core data models for iSaveMoney
//!
//! This module contains the value types and records of the ledger domain:
//! money, categories, transactions, recurrence templates and budget months.

pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod template;
pub mod transaction;

pub use category::Category;
pub use ids::{CategoryId, TemplateId, TransactionId};
pub use money::{Currency, Money, RoundingMode};
pub use period::YearMonth;
pub use template::{EndCondition, Frequency, RecurrenceRule, RecurrenceTemplate, TemplateUpdate};
pub use transaction::{Transaction, TransactionAmendment, TransactionKind};
