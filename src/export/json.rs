//! JSON export
//!
//! Dumps the complete ledger, every transaction version included, with a
//! schema version and a small metadata block.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SaveError, SaveResult};
use crate::models::{Category, RecurrenceTemplate, Transaction};
use crate::services::LedgerState;
use crate::storage::Snapshot;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full ledger export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
    pub templates: Vec<RecurrenceTemplate>,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub category_count: usize,
    /// Stored versions, voided ones included
    pub transaction_count: usize,
    pub live_transaction_count: usize,
    pub template_count: usize,
    pub earliest_transaction: Option<String>,
    pub latest_transaction: Option<String>,
}

impl FullExport {
    pub fn from_state(state: &LedgerState) -> Self {
        let categories: Vec<_> = state.tree.iter().cloned().collect();
        let transactions: Vec<_> = state.store.iter().cloned().collect();
        let templates = state.store.templates().to_vec();

        let metadata = ExportMetadata {
            category_count: categories.len(),
            transaction_count: transactions.len(),
            live_transaction_count: transactions.iter().filter(|t| t.is_live()).count(),
            template_count: templates.len(),
            earliest_transaction: transactions.iter().map(|t| t.date).min().map(|d| d.to_string()),
            latest_transaction: transactions.iter().map(|t| t.date).max().map(|d| d.to_string()),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            categories,
            transactions,
            templates,
            metadata,
        }
    }

    /// Check the schema version, the metadata counts, and that the records
    /// rebuild into a consistent ledger
    pub fn validate(&self) -> SaveResult<()> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(SaveError::Export(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            )));
        }

        let category_ids: HashSet<_> = self.categories.iter().map(|c| c.id).collect();
        let referenced = self
            .transactions
            .iter()
            .map(|t| t.category_id)
            .chain(self.templates.iter().map(|t| t.category_id));
        for id in referenced {
            if !category_ids.contains(&id) {
                return Err(SaveError::unknown_category(id.to_string()));
            }
        }

        let counts = (
            self.categories.len(),
            self.transactions.len(),
            self.templates.len(),
        );
        let declared = (
            self.metadata.category_count,
            self.metadata.transaction_count,
            self.metadata.template_count,
        );
        if counts != declared {
            return Err(SaveError::Export(format!(
                "Metadata counts {:?} do not match records {:?}",
                declared, counts
            )));
        }

        LedgerState::from_snapshot(self.to_snapshot())?;
        Ok(())
    }

    /// The exported records as a storage snapshot
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            categories: self.categories.clone(),
            transactions: self.transactions.clone(),
            templates: self.templates.clone(),
        }
    }
}

/// Write the full ledger as JSON
pub fn export_full_json<W: Write>(state: &LedgerState, mut writer: W, pretty: bool) -> SaveResult<()> {
    let export = FullExport::from_state(state);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, &export)
    } else {
        serde_json::to_writer(&mut writer, &export)
    }
    .map_err(|e| SaveError::Export(e.to_string()))?;
    writer
        .flush()
        .map_err(|e| SaveError::Export(e.to_string()))
}

/// Parse and validate an export produced by [`export_full_json`]
pub fn read_export(json: &str) -> SaveResult<FullExport> {
    let export: FullExport = serde_json::from_str(json)?;
    export.validate()?;
    Ok(export)
}
