//! File I/O utilities with atomic writes
//!
//! A write either replaces the whole file or leaves the previous contents
//! in place.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{SaveError, SaveResult};

/// Read JSON from a file, returning a default value if the file doesn't exist
pub fn read_json<T, P>(path: P) -> SaveResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| SaveError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SaveError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to a temp file, sync, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> SaveResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let staged = stage_json(path, data)?;
    staged.commit()
}

/// A fully written and synced temp file waiting to replace its target
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    /// Rename the temp file over the target
    pub fn commit(self) -> SaveResult<()> {
        fs::rename(&self.temp_path, &self.target).map_err(|e| {
            let _ = fs::remove_file(&self.temp_path);
            SaveError::Storage(format!(
                "Failed to replace {}: {}",
                self.target.display(),
                e
            ))
        })
    }

    /// Remove the temp file without touching the target
    pub fn discard(self) {
        let _ = fs::remove_file(&self.temp_path);
    }
}

/// Serialize `data` next to `path` without replacing it yet
pub fn stage_json<T, P>(path: P, data: &T) -> SaveResult<StagedFile>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SaveError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| SaveError::Storage(format!("Failed to create temp file: {}", e)))?;

    let written = (|| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| SaveError::Storage(format!("Failed to serialize data: {}", e)))?;
        writer
            .flush()
            .map_err(|e| SaveError::Storage(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| SaveError::Storage(format!("Failed to sync data: {}", e)))
    })();

    match written {
        Ok(()) => Ok(StagedFile {
            temp_path,
            target: path.to_path_buf(),
        }),
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(e)
        }
    }
}
