//! Error types for sheet import

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sheet import operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for project, settings and host operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse project file {path}: {message}")]
    ProjectParse { path: PathBuf, message: String },

    #[error("Failed to serialize project: {0}")]
    ProjectSerialize(#[from] toml::ser::Error),

    #[error("Settings store error: {0}")]
    Settings(String),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("Unknown file group: {0}")]
    UnknownFileGroup(String),

    #[error("Failed to open {path} in an external viewer: {message}")]
    ViewerLaunch { path: PathBuf, message: String },

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

/// Failure reported by an import run
///
/// `Cancelled` is not a failure from the user's point of view: the wizard
/// closes instead of showing the error page.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Import was cancelled")]
    Cancelled,

    #[error("Failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("Workbook has no sheet for file group '{group}'")]
    MissingSheet { group: String },

    #[error("IO error while writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid resource file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Import worker panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(String),
}

impl ImportError {
    /// Whether this error represents a user-initiated cancellation
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ImportError::Cancelled)
    }
}
