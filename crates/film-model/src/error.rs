use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("row has {actual} cells but the table has {expected} columns")]
    RowWidth { expected: usize, actual: usize },
    #[error("key column '{column}' is not a declared header of dataset '{dataset}'")]
    UnknownKeyColumn { dataset: String, column: String },
    #[error("dataset '{0}' declares no key columns")]
    NoKeyColumns(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
