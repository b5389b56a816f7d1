//! Exporting tables as delimited files or workbooks, one file per dataset.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use film_model::{CellValue, Table};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{IngestError, Result};
use crate::workbook::write_workbook;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Xlsx => "xlsx",
        }
    }

    /// Field delimiter of delimited formats; `None` for workbooks.
    pub fn delimiter(self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Xlsx => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(IngestError::UnsupportedFormat {
                format: value.to_string(),
                path: None,
            }),
        }
    }
}

/// Path of the file [`export_table`] writes for `name`.
pub fn export_path(dir: &Path, name: &str, format: ExportFormat) -> PathBuf {
    dir.join(format!("{name}.{}", format.extension()))
}

/// Writes `table` to `<dir>/<name>.<ext>` with a header row.
///
/// Delimited cells are written in their canonical rendering; list cells are
/// joined with `", "`. Returns the written path.
pub fn export_table(table: &Table, dir: &Path, name: &str, format: ExportFormat) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let path = export_path(dir, name, format);
    match format.delimiter() {
        Some(delimiter) => write_delimited(table, &path, delimiter)?,
        None => write_workbook(table, &path)?,
    }

    info!(
        path = %path.display(),
        rows = table.height(),
        format = %format,
        "exported dataset"
    );
    Ok(path)
}

fn write_delimited(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let write_error = |source: csv::Error| IngestError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(write_error)?;
    writer.write_record(table.columns()).map_err(write_error)?;
    for row in table.rows() {
        writer
            .write_record(row.cells.iter().map(CellValue::render))
            .map_err(write_error)?;
    }
    writer
        .flush()
        .map_err(|e| write_error(csv::Error::from(e)))
}
