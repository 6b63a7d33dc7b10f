//! In-memory storage
//!
//! Keeps the snapshot in a mutex. Useful for tests and for embedding the
//! engine where persistence is handled elsewhere.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{Changeset, LedgerStorage, Snapshot};
use crate::error::{SaveError, SaveResult};

/// [`LedgerStorage`] that never touches the filesystem
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: Mutex<Snapshot>,
    saves: Mutex<usize>,
    reject_saves: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Default::default()
        }
    }

    /// Make every following save fail with a storage error
    pub fn reject_saves(&self, reject: bool) {
        self.reject_saves.store(reject, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }

    /// Copy of everything stored
    pub fn snapshot(&self) -> SaveResult<Snapshot> {
        self.load()
    }
}

impl LedgerStorage for MemoryStorage {
    fn load(&self) -> SaveResult<Snapshot> {
        let snapshot = self
            .snapshot
            .lock()
            .map_err(|e| SaveError::Storage(format!("Failed to acquire lock: {}", e)))?;
        Ok(snapshot.clone())
    }

    fn save(&self, changes: &Changeset) -> SaveResult<()> {
        if self.reject_saves.load(Ordering::SeqCst) {
            return Err(SaveError::Storage("storage is rejecting writes".into()));
        }

        let mut snapshot = self
            .snapshot
            .lock()
            .map_err(|e| SaveError::Storage(format!("Failed to acquire lock: {}", e)))?;
        changes.apply_to(&mut snapshot);

        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
