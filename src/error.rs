//! Custom error types for iSaveMoney
//!
//! This module defines the error hierarchy for the engine using thiserror.
//! Every failure is a structured value; turning it into a display message is
//! left to the surface that called the engine.

use thiserror::Error;

use crate::models::period::PeriodParseError;
use crate::models::Currency;

/// The main error type for iSaveMoney operations
#[derive(Error, Debug)]
pub enum SaveError {
    /// Arithmetic between two amounts in different currencies
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// An amount left the representable range of minor units
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Inserting or moving a category would make it its own ancestor
    #[error("Category cycle detected: {category} cannot have parent {parent}")]
    CycleDetected { category: String, parent: String },

    /// Archiving a category that still has live children
    #[error("Category '{category}' has {live_children} active child categories")]
    CategoryHasChildren {
        category: String,
        live_children: usize,
    },

    /// New activity targeting an archived category
    #[error("Category is archived: {0}")]
    CategoryArchived(String),

    /// A dangling category, transaction or template id
    #[error("Unknown {entity_type}: {identifier}")]
    UnknownReference {
        entity_type: &'static str,
        identifier: String,
    },

    /// A recurrence rule that cannot produce a well-defined series
    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrenceRule(String),

    /// Amending a version that has already been superseded
    #[error("Transaction {0} has already been amended")]
    AmendTargetVoided(String),

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl SaveError {
    /// Create an unknown-reference error for categories
    pub fn unknown_category(identifier: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity_type: "category",
            identifier: identifier.into(),
        }
    }

    /// Create an unknown-reference error for transactions
    pub fn unknown_transaction(identifier: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity_type: "transaction",
            identifier: identifier.into(),
        }
    }

    /// Create an unknown-reference error for recurrence templates
    pub fn unknown_template(identifier: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity_type: "recurrence template",
            identifier: identifier.into(),
        }
    }

    /// Check if this is an unknown-reference error
    pub fn is_unknown_reference(&self) -> bool {
        matches!(self, Self::UnknownReference { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<PeriodParseError> for SaveError {
    fn from(err: PeriodParseError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<csv::Error> for SaveError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for iSaveMoney operations
pub type SaveResult<T> = Result<T, SaveError>;
