//! Error types for loading and exporting tables.

use std::path::PathBuf;

use film_model::ModelError;
use thiserror::Error;

/// Errors that can occur while reading sources or writing datasets.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Export directory not found.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the size limit.
    #[error("file {path} is too large ({size} bytes, limit {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Extension or export format not handled.
    #[error("unsupported format '{format}'")]
    UnsupportedFormat {
        format: String,
        path: Option<PathBuf>,
    },

    // === CSV Errors ===
    /// Failed to parse a delimited file with Polars.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to write a delimited file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // === Workbook Errors ===
    /// Failed to read or write an Excel workbook.
    #[error("failed to process workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    // === Table Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/movies.csv"),
        };
        assert_eq!(err.to_string(), "file not found: /data/movies.csv");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("title".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
