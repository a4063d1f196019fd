//! Error handling for the letter linker.

pub mod util;

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for the linkage pipeline
#[derive(Debug, thiserror::Error)]
pub enum LinkageError {
    /// Error opening, reading or writing a file, with the path involved
    #[error("IO error at {}: {context}: {source}", path.display())]
    Io {
        /// Path that was being accessed
        path: PathBuf,
        /// What the file was needed for
        context: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// IO error without path information
    #[error("IO error: {0}")]
    RawIo(#[from] io::Error),

    /// Error reading or writing delimited files
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error parsing or producing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error building Arrow arrays or batches
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error converting between rows and Arrow batches
    #[error("Serde arrow error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// A record's chunk container exists but has an unexpected shape
    #[error("Malformed NLP record '{file_name}': {reason}")]
    MalformedRecord {
        /// Filename the record refers to
        file_name: String,
        /// What was wrong with it
        reason: String,
    },

    /// Derived structures disagree with each other; the run cannot continue
    #[error("Internal consistency error: {0}")]
    InternalConsistency(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LinkageError {
    /// Wrap an IO error with the path and purpose of the access
    pub fn io(path: impl AsRef<Path>, context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            context: context.into(),
            source,
        }
    }

    /// Create a malformed record error
    pub fn malformed_record(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for linkage operations
pub type Result<T> = std::result::Result<T, LinkageError>;
