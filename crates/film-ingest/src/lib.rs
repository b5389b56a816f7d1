//! Loading raw film sources and exporting cleaned datasets.
//!
//! # Features
//!
//! - **Loading**: CSV and TSV sources read with Polars into [`Table`](film_model::Table)s,
//!   tolerating undecodable bytes and ragged lines; XLSX workbooks read with calamine
//! - **Headers**: raw header inspection for writing rename lists
//! - **Export**: one delimited file or workbook per dataset, named after the dataset

mod error;
mod reader;
mod workbook;
mod writer;

// === Error Types ===
pub use error::{IngestError, Result};

// === Loading ===
pub use reader::{
    MAX_FILE_SIZE, SourceFormat, any_to_cell, check_file_size_with_limit, dataframe_to_table,
    load_table, read_headers,
};

pub use workbook::data_to_cell;

// === Export ===
pub use writer::{ExportFormat, export_path, export_table};
