//! Recurrence template model
//!
//! A template describes a cash flow that repeats on a calendar rule. It is
//! expanded into projected transactions on demand and may be materialized
//! into actual transactions once occurrences fall due.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ids::{CategoryId, TemplateId, TransactionId};
use super::money::Money;
use super::transaction::{Transaction, TransactionKind};
use crate::error::{SaveError, SaveResult};

/// How often a template repeats, with its calendar anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    /// Every `interval` weeks on `weekday`
    Weekly { weekday: Weekday },
    /// Every `interval` months on `day`, clamped to short months
    Monthly { day: u32 },
    /// Every `interval` years on the start date's month and day
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly { weekday } => write!(f, "weekly on {:?}", weekday),
            Self::Monthly { day } => write!(f, "monthly on day {}", day),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

/// When a series stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EndCondition {
    #[default]
    Never,
    /// Stop after this many occurrences, counted from the series start
    AfterCount(u32),
    /// Last possible occurrence date (inclusive)
    UntilDate(NaiveDate),
}

/// A full recurrence rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    #[serde(default)]
    pub end: EndCondition,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            end: EndCondition::Never,
        }
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily, 1)
    }

    pub fn weekly(weekday: Weekday) -> Self {
        Self::new(Frequency::Weekly { weekday }, 1)
    }

    pub fn monthly(day: u32) -> Self {
        Self::new(Frequency::Monthly { day }, 1)
    }

    pub fn yearly() -> Self {
        Self::new(Frequency::Yearly, 1)
    }

    pub fn every(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn ending(mut self, end: EndCondition) -> Self {
        self.end = end;
        self
    }

    /// Reject rules that cannot produce a well-defined series
    pub fn validate(&self, start_date: NaiveDate) -> SaveResult<()> {
        if self.interval == 0 {
            return Err(SaveError::InvalidRecurrenceRule(
                "interval must be at least 1".into(),
            ));
        }

        if let Frequency::Monthly { day } = self.frequency {
            if !(1..=31).contains(&day) {
                return Err(SaveError::InvalidRecurrenceRule(format!(
                    "day of month must be 1-31, got {}",
                    day
                )));
            }
        }

        match self.end {
            EndCondition::AfterCount(0) => Err(SaveError::InvalidRecurrenceRule(
                "occurrence count must be at least 1".into(),
            )),
            EndCondition::UntilDate(until) if until < start_date => {
                Err(SaveError::InvalidRecurrenceRule(format!(
                    "end date {} is before start date {}",
                    until, start_date
                )))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interval == 1 {
            write!(f, "{}", self.frequency)?;
        } else {
            write!(f, "{} (every {})", self.frequency, self.interval)?;
        }
        match self.end {
            EndCondition::Never => Ok(()),
            EndCondition::AfterCount(n) => write!(f, ", {} times", n),
            EndCondition::UntilDate(d) => write!(f, ", until {}", d),
        }
    }
}

/// A recurring transaction template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceTemplate {
    pub id: TemplateId,

    /// Store-assigned insertion order, used to order same-day projections
    #[serde(default)]
    pub seq: u64,

    /// Signed amount of every occurrence
    pub amount: Money,

    pub category_id: CategoryId,

    pub start_date: NaiveDate,

    pub rule: RecurrenceRule,

    /// Occurrences on or before this date have become actual transactions
    #[serde(default)]
    pub last_materialized: Option<NaiveDate>,

    #[serde(default)]
    pub note: String,

    /// Paused templates do not expand
    #[serde(default = "default_active")]
    pub active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl RecurrenceTemplate {
    pub fn new(
        amount: Money,
        category_id: CategoryId,
        start_date: NaiveDate,
        rule: RecurrenceRule,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TemplateId::new(),
            seq: 0,
            amount,
            category_id,
            start_date,
            rule,
            last_materialized: None,
            note: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn validate(&self) -> SaveResult<()> {
        self.rule.validate(self.start_date)
    }

    /// Apply an update, returning whether anything changed
    pub fn apply(&mut self, update: &TemplateUpdate) -> bool {
        let before = self.clone();
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(rule) = update.rule {
            self.rule = rule;
        }
        if let Some(note) = &update.note {
            self.note = note.clone();
        }
        if let Some(active) = update.active {
            self.active = active;
        }

        let changed = *self != before;
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Synthesize the projected transaction for one occurrence
    ///
    /// The id is derived from the template and date, so repeated expansion
    /// of the same template state yields identical records.
    pub fn occurrence(&self, date: NaiveDate) -> Transaction {
        let id = self.occurrence_id(date);
        Transaction {
            id,
            origin: id,
            version: 1,
            seq: 0,
            date,
            amount: self.amount,
            category_id: self.category_id,
            note: self.note.clone(),
            kind: TransactionKind::Projected,
            voided: false,
            amends: None,
            template_id: Some(self.id),
            created_at: self.updated_at,
        }
    }

    fn occurrence_id(&self, date: NaiveDate) -> TransactionId {
        let name = date.format("%Y-%m-%d").to_string();
        TransactionId::from_uuid(Uuid::new_v5(self.id.as_uuid(), name.as_bytes()))
    }
}

/// Field changes for a template; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    pub amount: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub start_date: Option<NaiveDate>,
    pub rule: Option<RecurrenceRule>,
    pub note: Option<String>,
    pub active: Option<bool>,
}
