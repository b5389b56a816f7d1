//! Error types for matching and aggregation.

use film_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    /// Unknown policy name, or a policy that cannot run as configured.
    #[error("invalid conflict policy '{0}'")]
    InvalidPolicy(String),

    #[error("similarity threshold {0} is outside 0..=100")]
    InvalidThreshold(u8),

    #[error("at least one key column is required")]
    NoKeyColumns,

    #[error("key column '{0}' not found in table")]
    MissingKeyColumn(String),

    /// Raised by a [`ConflictOperator`](crate::ConflictOperator); never fatal
    /// to an aggregation run.
    #[error("conflict operator failed: {0}")]
    Operator(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, MatchError>;
