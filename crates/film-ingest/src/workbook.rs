//! Excel workbooks: the first worksheet in, one worksheet out.

use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::NaiveTime;
use film_model::{CellValue, Table};
use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::error::{IngestError, Result};

fn workbook_error(path: &Path, message: impl ToString) -> IngestError {
    IngestError::Workbook {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn first_sheet(path: &Path) -> Result<Range<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| workbook_error(path, e))?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_error(path, "workbook has no worksheet"))?
        .map_err(|e| workbook_error(path, e))
}

/// Header names from the first row; blank headers are numbered by position.
fn header_names(range: &Range<Data>) -> Vec<String> {
    range
        .rows()
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(idx, cell)| match data_to_cell(cell) {
                    CellValue::Missing => format!("column_{}", idx + 1),
                    value => value.render().trim().to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Reads the first worksheet, taking its first row as headers.
pub(crate) fn read_workbook(path: &Path) -> Result<Table> {
    let range = first_sheet(path)?;
    let mut table = Table::new(header_names(&range))?;
    for row in range.rows().skip(1) {
        table.push_row(row.iter().map(data_to_cell).collect::<Vec<_>>())?;
    }
    debug!(rows = table.height(), "converted worksheet");
    Ok(table)
}

pub(crate) fn read_workbook_headers(path: &Path) -> Result<Vec<String>> {
    first_sheet(path).map(|range| header_names(&range))
}

/// Maps a worksheet cell onto a cell. Blank strings and error cells become
/// `Missing`; date-times are rendered in ISO form.
pub fn data_to_cell(value: &Data) -> CellValue {
    match value {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                CellValue::Missing
            } else {
                CellValue::text(s.as_str())
            }
        }
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(stamp) if stamp.time() == NaiveTime::MIN => {
                CellValue::text(stamp.format("%Y-%m-%d").to_string())
            }
            Some(stamp) => CellValue::text(stamp.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
    }
}

/// Writes `table` as a single worksheet with a header row.
///
/// Numbers and booleans keep their cell type; other values are written in
/// their canonical rendering and missing cells are left empty.
pub(crate) fn write_workbook(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.columns().iter().enumerate() {
        let col = u16::try_from(col).map_err(|e| workbook_error(path, e))?;
        worksheet
            .write_string(0, col, name)
            .map_err(|e| workbook_error(path, e))?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        let row_num = u32::try_from(idx + 1).map_err(|e| workbook_error(path, e))?;
        for (col, cell) in row.cells.iter().enumerate() {
            let col = u16::try_from(col).map_err(|e| workbook_error(path, e))?;
            let written = match cell {
                CellValue::Missing => continue,
                CellValue::Number(value) => worksheet.write_number(row_num, col, *value),
                CellValue::Boolean(value) => worksheet.write_boolean(row_num, col, *value),
                other => worksheet.write_string(row_num, col, other.render()),
            };
            written.map_err(|e| workbook_error(path, e))?;
        }
    }
    workbook.save(path).map_err(|e| workbook_error(path, e))
}
