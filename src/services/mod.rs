//! Service layer for iSaveMoney
//!
//! The [`Ledger`] is the query and command surface over the engine. It
//! validates commands against the category tree and ledger store, persists
//! the resulting records through a [`LedgerStorage`](crate::storage::LedgerStorage)
//! collaborator and writes the audit log.

mod category;
mod ledger;
mod recurrence;
mod report;
mod transaction;

pub use ledger::{Ledger, LedgerState};
