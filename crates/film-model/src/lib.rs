//! Data model shared by the film cleaning crates.
//!
//! - [`CellValue`]: tagged union over the value kinds found in source files
//! - [`Table`]: ordered unique columns over positional rows
//! - [`Dataset`]: a table with a declared header set and identity key columns
//! - [`HeaderOrder`]: canonical column order and plural folding

pub mod dataset;
pub mod error;
pub mod header;
pub mod table;
pub mod value;

pub use dataset::Dataset;
pub use error::{ModelError, Result};
pub use header::{CANONICAL_HEADERS, HeaderOrder};
pub use table::{Row, Table};
pub use value::{CellValue, DateValue, ValueKind, format_numeric};
