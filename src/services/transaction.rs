//! Transaction commands and queries

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use tracing::debug;

use super::ledger::Ledger;
use crate::audit::{AuditEntry, EntityType};
use crate::error::{SaveError, SaveResult};
use crate::ledger::CategoryFilter;
use crate::models::{CategoryId, Money, Transaction, TransactionAmendment, TransactionId};
use crate::storage::{Changeset, LedgerStorage};

impl<S: LedgerStorage> Ledger<S> {
    /// Record a new actual transaction
    pub fn record_transaction(
        &self,
        date: NaiveDate,
        amount: Money,
        category_id: CategoryId,
        note: &str,
    ) -> SaveResult<Transaction> {
        let mut state = self.write()?;
        state.tree.ensure_accepts_activity(category_id)?;

        let txn = Transaction::actual(date, amount, category_id).with_note(note.trim());
        let txn = state.store.prepare_record(txn)?;

        self.persist(&Changeset::new().transaction(txn.clone()))?;
        state.store.commit_record(txn.clone());
        drop(state);

        debug!(transaction = %txn.id, date = %txn.date, amount = %txn.amount, "recorded transaction");
        self.audit(vec![AuditEntry::create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.note.clone()),
            &txn,
        )]);
        Ok(txn)
    }

    /// Supersede the live version `id` with a corrected successor
    ///
    /// The previous version stays in the history, marked void.
    pub fn amend_transaction(
        &self,
        id: TransactionId,
        changes: TransactionAmendment,
    ) -> SaveResult<Transaction> {
        let mut state = self.write()?;
        if let Some(category_id) = changes.category_id {
            state.tree.ensure_accepts_activity(category_id)?;
        }

        let amendment = state.store.prepare_amend(id, &changes)?;
        let replaced = state.store.require(id)?.clone();
        let successor = amendment.successor.clone();

        self.persist(
            &Changeset::new()
                .transaction(amendment.voided.clone())
                .transaction(amendment.successor.clone()),
        )?;
        state.store.commit_amend(amendment);
        drop(state);

        debug!(
            replaced = %id,
            successor = %successor.id,
            version = successor.version,
            "amended transaction"
        );
        self.audit(vec![AuditEntry::amend(
            successor.origin.to_string(),
            Some(successor.note.clone()),
            &replaced,
            &successor,
        )]);
        Ok(successor)
    }

    // === Queries ===

    /// Live actual transactions in the inclusive date range, in ledger order
    pub fn list_transactions(
        &self,
        range: RangeInclusive<NaiveDate>,
        filter: Option<&CategoryFilter>,
    ) -> SaveResult<Vec<Transaction>> {
        Ok(self.read()?.store.query(range, filter))
    }

    /// Every version of the logical transaction `id` belongs to, oldest first
    pub fn history(&self, id: TransactionId) -> SaveResult<Vec<Transaction>> {
        self.read()?.store.history(id)
    }

    pub fn get_transaction(&self, id: TransactionId) -> SaveResult<Transaction> {
        Ok(self.read()?.store.require(id)?.clone())
    }

    /// The live version of the chain `id` belongs to
    pub fn current_transaction(&self, id: TransactionId) -> SaveResult<Transaction> {
        self.read()?.store.current(id)
    }

    /// Resolve a full id or a short `txn-xxxxxxxx` form to a version id
    pub fn find_transaction(&self, identifier: &str) -> SaveResult<TransactionId> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return Ok(id);
        }

        let state = self.read()?;
        let mut matches = state.store.iter().filter(|t| t.id.short() == identifier);
        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(txn.id),
            (Some(_), Some(_)) => Err(SaveError::Validation(format!(
                "Ambiguous transaction id '{}'",
                identifier
            ))),
            _ => Err(SaveError::unknown_transaction(identifier)),
        }
    }
}
