use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate headings detected in index file: {0}")]
    DuplicateHeadings(String),

    #[error("Unsafe path rejected: {}", .0.display())]
    UnsafePath(PathBuf),

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid scoring tables: {0}")]
    Tables(#[from] toml::de::Error),

    #[error("scoring tables version {found} is not supported (expected {expected})")]
    TablesVersion { found: u32, expected: u32 },

    #[error("invalid definitions file {}: {source}", .path.display())]
    Definitions {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid exclude pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("--apply requires an interactive terminal: {0}")]
    NoTerminal(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
