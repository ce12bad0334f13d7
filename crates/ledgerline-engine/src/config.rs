//! Engine configuration.

use crate::error::ConfigError;
use ledgerline_core::Taxonomy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of parallel workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Configuration for a [`crate::ReportEngine`].
///
/// Every field has a default, so a JSON file only needs the keys it
/// overrides:
///
/// ```json
/// { "ledger_dir": "data/ledgers", "workers": 8 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Directory containing the ledger files.
    pub ledger_dir: PathBuf,
    /// Directory the reports are written to.
    pub output_dir: PathBuf,
    /// Extension of ledger files, without the dot.
    pub extension: String,
    /// Number of parallel workers, and the number of partitions requested.
    pub workers: usize,
    /// Skip the first line of every ledger file.
    pub has_header: bool,
    /// Stop sibling tasks as soon as one task fails.
    pub cancel_on_failure: bool,
    /// Optional JSON taxonomy replacing the standard one.
    pub taxonomy: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ledger_dir: PathBuf::from("tmp"),
            output_dir: PathBuf::from("out"),
            extension: "csv".to_string(),
            workers: DEFAULT_WORKERS,
            has_header: false,
            cancel_on_failure: true,
            taxonomy: None,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the ledger directory.
    #[must_use]
    pub fn with_ledger_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ledger_dir = dir.into();
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the ledger file extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Set the number of workers. Zero is treated as one.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Skip a header line in every ledger file.
    #[must_use]
    pub const fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Choose whether a failing task cancels its siblings.
    #[must_use]
    pub const fn with_cancel_on_failure(mut self, cancel: bool) -> Self {
        self.cancel_on_failure = cancel;
        self
    }

    /// Use a JSON taxonomy file.
    #[must_use]
    pub fn with_taxonomy(mut self, path: impl Into<PathBuf>) -> Self {
        self.taxonomy = Some(path.into());
        self
    }

    /// Resolve the taxonomy: the configured file, or the standard one.
    pub fn load_taxonomy(&self) -> Result<Taxonomy, ConfigError> {
        let Some(path) = &self.taxonomy else {
            return Ok(Taxonomy::standard());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Taxonomy::from_json(&content).map_err(|source| ConfigError::Taxonomy {
            path: path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.ledger_dir, PathBuf::from("tmp"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.workers, 4);
        assert!(config.cancel_on_failure);
        assert!(!config.has_header);
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "ledger_dir": "ledgers", "workers": 8 }}"#).unwrap();
        file.flush().unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.ledger_dir, PathBuf::from("ledgers"));
        assert_eq!(config.workers, 8);
        assert_eq!(config.extension, "csv");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "threads": 8 }}"#).unwrap();
        file.flush().unwrap();

        assert!(matches!(
            EngineConfig::from_json_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(EngineConfig::default().with_workers(0).workers, 1);
    }

    #[test]
    fn test_missing_taxonomy_file() {
        let config = EngineConfig::default().with_taxonomy("/nonexistent/taxonomy.json");
        assert!(matches!(
            config.load_taxonomy(),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(
            EngineConfig::default().load_taxonomy().unwrap(),
            Taxonomy::standard()
        );
    }
}
