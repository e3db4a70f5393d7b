use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::reconcile::Severity;

pub const DEFAULT_CONFIG: &str = ".defdex.toml";

/// Project settings read from `.defdex.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The index document to check and rewrite.
    pub index_file: PathBuf,
    /// Root of the API documents that contain the Go definitions.
    pub docs_dir: PathBuf,
    /// Glob patterns, relative to `docs_dir`, of documents to skip.
    pub exclude: Vec<String>,
    /// Best scores at or below this leave a definition unresolved.
    pub confidence_threshold: f64,
    /// Ordering findings reported per section before the rest are summarized.
    pub max_order_warnings: usize,
    pub moved_severity: Severity,
    pub reordered_severity: Severity,
    /// Replacement scoring tables.
    pub tables: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            index_file: PathBuf::from("docs/api_defs_index.md"),
            docs_dir: PathBuf::from("docs"),
            exclude: Vec::new(),
            confidence_threshold: 0.0,
            max_order_warnings: 5,
            moved_severity: Severity::Error,
            reordered_severity: Severity::Warning,
            tables: None,
        }
    }
}

impl Config {
    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&raw).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
