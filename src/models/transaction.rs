//! Transaction model
//!
//! Actual transactions are recorded by the user and never edited in place:
//! an amendment voids the current version and appends a successor that
//! shares the same `origin`. Projected transactions are synthesized from
//! recurrence templates at query time and never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, TemplateId, TransactionId};
use super::money::Money;

/// Whether a transaction was entered or synthesized from a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Actual,
    Projected,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actual => write!(f, "actual"),
            Self::Projected => write!(f, "projected"),
        }
    }
}

/// One version of a ledger transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier of this version
    pub id: TransactionId,

    /// Stable logical id shared by every version (the first version's id)
    pub origin: TransactionId,

    /// 1 for the original entry, incremented on each amendment
    pub version: u32,

    /// Store-assigned insertion sequence; breaks ties between equal dates
    #[serde(default)]
    pub seq: u64,

    /// Transaction date
    pub date: NaiveDate,

    /// Signed amount (positive for income, negative for expense)
    pub amount: Money,

    pub category_id: CategoryId,

    #[serde(default)]
    pub note: String,

    #[serde(default)]
    pub kind: TransactionKind,

    /// Set once a successor version supersedes this one
    #[serde(default)]
    pub voided: bool,

    /// The version this one replaced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amends: Option<TransactionId>,

    /// Template this entry was generated from, for materialized or projected entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,

    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new actual transaction (version 1 of its own chain)
    pub fn actual(date: NaiveDate, amount: Money, category_id: CategoryId) -> Self {
        let id = TransactionId::new();
        Self {
            id,
            origin: id,
            version: 1,
            seq: 0,
            date,
            amount,
            category_id,
            note: String::new(),
            kind: TransactionKind::Actual,
            voided: false,
            amends: None,
            template_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn is_actual(&self) -> bool {
        self.kind == TransactionKind::Actual
    }

    pub fn is_projected(&self) -> bool {
        self.kind == TransactionKind::Projected
    }

    /// Not superseded by a later version
    pub fn is_live(&self) -> bool {
        !self.voided
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    /// Build the version that replaces this one
    ///
    /// The caller is responsible for voiding `self` in the same commit.
    pub fn successor(&self, changes: &TransactionAmendment) -> Self {
        let id = TransactionId::new();
        Self {
            id,
            origin: self.origin,
            version: self.version + 1,
            seq: 0,
            date: changes.date.unwrap_or(self.date),
            amount: changes.amount.unwrap_or(self.amount),
            category_id: changes.category_id.unwrap_or(self.category_id),
            note: changes.note.clone().unwrap_or_else(|| self.note.clone()),
            kind: TransactionKind::Actual,
            voided: false,
            amends: Some(self.id),
            template_id: self.template_id,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.amount)?;
        if !self.note.is_empty() {
            write!(f, " ({})", self.note)?;
        }
        Ok(())
    }
}

/// Field changes for an amendment; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionAmendment {
    pub date: Option<NaiveDate>,
    pub amount: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub note: Option<String>,
}

impl TransactionAmendment {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.category_id.is_none()
            && self.note.is_none()
    }
}
