//! JSON file storage
//!
//! The whole ledger lives in one file, `ledger.json`, under the data
//! directory. A save writes the merged snapshot to a synced temp file and
//! renames it over the old one, so a changeset lands completely or not at
//! all.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::file_io::{read_json, stage_json, StagedFile};
use super::{Changeset, LedgerStorage, Snapshot};
use crate::config::paths::SavePaths;
use crate::error::SaveResult;
use crate::models::{Category, RecurrenceTemplate, Transaction};

/// On-disk layout of `ledger.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerData {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default)]
    templates: Vec<RecurrenceTemplate>,
}

impl From<LedgerData> for Snapshot {
    fn from(data: LedgerData) -> Self {
        Snapshot {
            categories: data.categories,
            transactions: data.transactions,
            templates: data.templates,
        }
    }
}

impl From<Snapshot> for LedgerData {
    fn from(snapshot: Snapshot) -> Self {
        LedgerData {
            categories: snapshot.categories,
            transactions: snapshot.transactions,
            templates: snapshot.templates,
        }
    }
}

/// [`LedgerStorage`] backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonStorage {
    paths: SavePaths,
}

impl JsonStorage {
    /// Create storage rooted at `paths`, creating the data directory
    pub fn new(paths: SavePaths) -> SaveResult<Self> {
        paths.ensure_directories()?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &SavePaths {
        &self.paths
    }

    /// Write the merged ledger next to `ledger.json` without replacing it
    fn stage(&self, changes: &Changeset) -> SaveResult<StagedFile> {
        let mut snapshot = self.load()?;
        changes.apply_to(&mut snapshot);
        stage_json(self.paths.ledger_file(), &LedgerData::from(snapshot))
    }
}

impl LedgerStorage for JsonStorage {
    fn load(&self) -> SaveResult<Snapshot> {
        let data: LedgerData = read_json(self.paths.ledger_file())?;

        debug!(
            categories = data.categories.len(),
            transactions = data.transactions.len(),
            templates = data.templates.len(),
            "loaded ledger file"
        );

        Ok(data.into())
    }

    fn save(&self, changes: &Changeset) -> SaveResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        self.stage(changes)?.commit()?;
        debug!(
            categories = changes.categories.len(),
            transactions = changes.transactions.len(),
            templates = changes.templates.len(),
            "saved changeset"
        );
        Ok(())
    }
}
