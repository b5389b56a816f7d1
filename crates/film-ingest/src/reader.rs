//! Reading delimited source files into tables.

use std::path::Path;

use film_model::{CellValue, Table};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::workbook::{read_workbook, read_workbook_headers};

/// Maximum source file size (500 MB).
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Source layouts understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl SourceFormat {
    /// Picks the layout from the file extension (`.csv`, `.tsv`, `.tab`,
    /// `.xlsx`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(IngestError::UnsupportedFormat {
                format: extension,
                path: Some(path.to_path_buf()),
            }),
        }
    }

    /// Field separator of delimited layouts; `None` for workbooks.
    pub fn separator(self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Xlsx => None,
        }
    }
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Reads a CSV/TSV/XLSX source into a [`Table`].
///
/// Delimited files: undecodable bytes are replaced rather than rejected,
/// ragged lines are truncated, and cell types are inferred from the first
/// rows. Workbooks: the first worksheet is read with its first row as headers.
pub fn load_table(path: &Path) -> Result<Table> {
    check_file_size_with_limit(path, MAX_FILE_SIZE)?;
    let format = SourceFormat::from_path(path)?;

    let table = match format.separator() {
        Some(separator) => read_delimited(path, separator)?,
        None => read_workbook(path)?,
    };
    info!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "loaded source"
    );
    Ok(table)
}

fn read_delimited(path: &Path, separator: u8) -> Result<Table> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .map_parse_options(|options| {
            options
                .with_separator(separator)
                .with_encoding(CsvEncoding::LossyUtf8)
                .with_truncate_ragged_lines(true)
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    dataframe_to_table(&df)
}

/// Reads only the header row of a source.
pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    check_file_size_with_limit(path, MAX_FILE_SIZE)?;
    let Some(separator) = SourceFormat::from_path(path)?.separator() else {
        return read_workbook_headers(path);
    };
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(separator)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let headers = reader.byte_headers().map_err(|e| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(headers
        .iter()
        .map(|field| {
            let name = String::from_utf8_lossy(field);
            name.strip_prefix('\u{feff}').unwrap_or(&name).to_string()
        })
        .collect())
}

/// Converts a DataFrame cell by cell.
pub fn dataframe_to_table(df: &DataFrame) -> Result<Table> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut table = Table::new(columns)?;
    let sources = df.get_columns();
    for idx in 0..df.height() {
        let cells: Vec<CellValue> = sources
            .iter()
            .map(|column| any_to_cell(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect();
        table.push_row(cells)?;
    }
    debug!(rows = table.height(), "converted dataframe");
    Ok(table)
}

/// Maps a Polars value onto a cell. Blank strings become `Missing`.
pub fn any_to_cell(value: AnyValue<'_>) -> CellValue {
    match value {
        AnyValue::Null => CellValue::Missing,
        AnyValue::Boolean(b) => CellValue::Boolean(b),
        AnyValue::Int8(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int16(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int32(v) => CellValue::Number(f64::from(v)),
        AnyValue::Int64(v) => CellValue::Number(v as f64),
        AnyValue::UInt8(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt16(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt32(v) => CellValue::Number(f64::from(v)),
        AnyValue::UInt64(v) => CellValue::Number(v as f64),
        AnyValue::Float32(v) => CellValue::Number(f64::from(v)),
        AnyValue::Float64(v) => CellValue::Number(v),
        AnyValue::String(s) => text_cell(s),
        AnyValue::StringOwned(s) => text_cell(s.as_str()),
        other => text_cell(&other.to_string()),
    }
}

fn text_cell(value: &str) -> CellValue {
    if value.trim().is_empty() {
        CellValue::Missing
    } else {
        CellValue::text(value)
    }
}
