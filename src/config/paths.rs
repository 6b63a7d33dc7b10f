//! Path management for iSaveMoney
//!
//! ## Path Resolution Order
//!
//! 1. `ISAVEMONEY_DATA_DIR` environment variable (if set)
//! 2. The platform data directory from `directories::ProjectDirs`
//!    (e.g. `~/.local/share/isavemoney` on Linux)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{SaveError, SaveResult};

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "ISAVEMONEY_DATA_DIR";

/// Manages all paths used by iSaveMoney
#[derive(Debug, Clone)]
pub struct SavePaths {
    base_dir: PathBuf,
}

impl SavePaths {
    /// Resolve the base directory from the environment or the platform default
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no home directory can be determined.
    pub fn new() -> SaveResult<Self> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "isavemoney")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| {
                    SaveError::Config("Could not determine a data directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create SavePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding the ledger file
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Categories, transactions and templates, saved together
    pub fn ledger_file(&self) -> PathBuf {
        self.data_dir().join("ledger.json")
    }

    /// Create the base and data directories
    pub fn ensure_directories(&self) -> SaveResult<()> {
        std::fs::create_dir_all(self.data_dir()).map_err(|e| {
            SaveError::Io(format!(
                "Failed to create data directory {}: {}",
                self.data_dir().display(),
                e
            ))
        })
    }

    /// Check if a ledger has been initialized here (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SavePaths::with_base_dir(temp_dir.path());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(DATA_DIR_ENV, temp_dir.path());

        let paths = SavePaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SavePaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SavePaths::with_base_dir(temp_dir.path());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
        assert_eq!(
            paths.ledger_file(),
            temp_dir.path().join("data").join("ledger.json")
        );
    }
}
