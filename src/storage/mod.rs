//! Storage layer for iSaveMoney
//!
//! The ledger service talks to persistence through [`LedgerStorage`]: it
//! loads a full [`Snapshot`] once and then hands over one [`Changeset`] per
//! command. Records are only ever upserted, never deleted.

pub mod file_io;
pub mod json;
pub mod memory;

pub use file_io::{read_json, write_json_atomic};
pub use json::JsonStorage;
pub use memory::MemoryStorage;

use serde::{Deserialize, Serialize};

use crate::error::SaveResult;
use crate::models::{Category, RecurrenceTemplate, Transaction};

/// Everything persisted for one ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub templates: Vec<RecurrenceTemplate>,
}

/// Records written by one command; saved as a unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub templates: Vec<RecurrenceTemplate>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn transaction(mut self, transaction: Transaction) -> Self {
        self.transactions.push(transaction);
        self
    }

    pub fn transactions(mut self, transactions: impl IntoIterator<Item = Transaction>) -> Self {
        self.transactions.extend(transactions);
        self
    }

    pub fn template(mut self, template: RecurrenceTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.transactions.is_empty() && self.templates.is_empty()
    }

    /// Upsert this changeset's records into `snapshot` by id, keeping order
    pub fn apply_to(&self, snapshot: &mut Snapshot) {
        upsert(&mut snapshot.categories, &self.categories, |c| c.id);
        upsert(&mut snapshot.transactions, &self.transactions, |t| t.id);
        upsert(&mut snapshot.templates, &self.templates, |t| t.id);
    }
}

fn upsert<T: Clone, K: PartialEq>(records: &mut Vec<T>, changes: &[T], key: impl Fn(&T) -> K) {
    for change in changes {
        let id = key(change);
        match records.iter_mut().find(|r| key(r) == id) {
            Some(existing) => *existing = change.clone(),
            None => records.push(change.clone()),
        }
    }
}

/// Persistence collaborator for the ledger service
pub trait LedgerStorage {
    /// Read every stored record
    fn load(&self) -> SaveResult<Snapshot>;

    /// Durably write one changeset; on error nothing may be visible
    fn save(&self, changes: &Changeset) -> SaveResult<()>;
}

impl<S: LedgerStorage + ?Sized> LedgerStorage for Box<S> {
    fn load(&self) -> SaveResult<Snapshot> {
        (**self).load()
    }

    fn save(&self, changes: &Changeset) -> SaveResult<()> {
        (**self).save(changes)
    }
}
