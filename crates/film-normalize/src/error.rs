//! Error types for column normalization.

use film_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The replacement names do not line up with the table's columns.
    #[error(
        "the number of names must match the number of columns: there are {expected} columns and {actual} names"
    )]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_reports_both_counts() {
        let err = NormalizeError::SchemaMismatch {
            expected: 3,
            actual: 2,
        };
        let message = err.to_string();
        assert!(message.contains("3 columns"));
        assert!(message.contains("2 names"));
    }
}
