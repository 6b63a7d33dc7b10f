//! The ledger service
//!
//! [`Ledger`] owns the in-memory state behind a reader/writer lock and a
//! storage collaborator. Every command runs under the write lock in three
//! steps: validate and build the records to write, hand them to storage as
//! one [`Changeset`], then install them in memory. A failure at either of
//! the first two steps leaves both memory and storage as they were.
//!
//! The command and query methods are spread over the sibling modules by
//! concern: categories, transactions, recurrence templates and reports.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::error::{SaveError, SaveResult};
use crate::ledger::{CategoryTree, LedgerStore};
use crate::models::Currency;
use crate::storage::{Changeset, LedgerStorage, Snapshot};

/// Everything the engine holds in memory
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub tree: CategoryTree,
    pub store: LedgerStore,
}

impl LedgerState {
    /// Rebuild and validate state from stored records
    pub fn from_snapshot(snapshot: Snapshot) -> SaveResult<Self> {
        let tree = CategoryTree::from_records(snapshot.categories)?;
        let store = LedgerStore::from_records(snapshot.transactions, snapshot.templates)?;

        let dangling = store
            .iter()
            .map(|t| t.category_id)
            .chain(store.templates().iter().map(|t| t.category_id))
            .find(|id| !tree.contains(*id));
        if let Some(id) = dangling {
            return Err(SaveError::unknown_category(id.to_string()));
        }

        Ok(Self { tree, store })
    }
}

/// Single-owner ledger over a storage collaborator
pub struct Ledger<S: LedgerStorage> {
    storage: S,
    state: RwLock<LedgerState>,
    audit: Option<AuditLogger>,
    base_currency: Currency,
}

impl<S: LedgerStorage> Ledger<S> {
    /// Load the ledger from `storage`
    ///
    /// `base_currency` is used for budget lines of categories without a limit.
    pub fn open(storage: S, base_currency: Currency) -> SaveResult<Self> {
        let snapshot = storage.load()?;
        let state = LedgerState::from_snapshot(snapshot)?;
        info!(
            categories = state.tree.len(),
            transactions = state.store.version_count(),
            templates = state.store.templates().len(),
            "ledger loaded"
        );

        Ok(Self {
            storage,
            state: RwLock::new(state),
            audit: None,
            base_currency,
        })
    }

    /// Record every successful command in `logger`
    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn base_currency(&self) -> Currency {
        self.base_currency
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// A copy of the current state, for callers that need several reads
    /// against one consistent view
    pub fn snapshot(&self) -> SaveResult<LedgerState> {
        Ok(self.read()?.clone())
    }

    pub(crate) fn read(&self) -> SaveResult<RwLockReadGuard<'_, LedgerState>> {
        self.state
            .read()
            .map_err(|e| SaveError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    pub(crate) fn write(&self) -> SaveResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|e| SaveError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Hand a changeset to storage; callers commit to memory only on success
    pub(crate) fn persist(&self, changes: &Changeset) -> SaveResult<()> {
        self.storage.save(changes)
    }

    /// Append audit entries for a command that has already been committed
    ///
    /// The command's effects are durable at this point, so a failing audit
    /// sink is reported as a warning rather than failing the command.
    pub(crate) fn audit(&self, entries: Vec<AuditEntry>) {
        let Some(logger) = &self.audit else {
            return;
        };
        if let Err(e) = logger.log_batch(&entries) {
            warn!(error = %e, path = %logger.path().display(), "failed to write audit log");
        }
    }
}
