//! Append-only audit log
//!
//! Each entry is one JSON line, flushed as soon as it is written.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{SaveError, SaveResult};

use super::entry::AuditEntry;

/// Writes audit entries to a JSON-lines file
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Append entries and flush once at the end
    pub fn log_batch(&self, entries: &[AuditEntry]) -> SaveResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| SaveError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut buffer = String::new();
        for entry in entries {
            let json = serde_json::to_string(entry)
                .map_err(|e| SaveError::Json(format!("Failed to serialize audit entry: {}", e)))?;
            buffer.push_str(&json);
            buffer.push('\n');
        }

        file.write_all(buffer.as_bytes())
            .map_err(|e| SaveError::Io(format!("Failed to write audit entry: {}", e)))?;
        file.flush()
            .map_err(|e| SaveError::Io(format!("Failed to flush audit log: {}", e)))
    }

    pub fn log(&self, entry: &AuditEntry) -> SaveResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Read every entry, oldest first
    pub fn read_all(&self) -> SaveResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| SaveError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                SaveError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                SaveError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The most recent `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> SaveResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }
}
