//! Permissive date parsing and date column normalization.
//!
//! Release dates arrive as integer years, ISO dates, US and European slash
//! dates, or prose such as `July 18, 2008`. Values that cannot be parsed are
//! kept as they are; a garbled date must not stop the rest of the pipeline.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use film_model::{CellValue, DateValue, Table};
use tracing::debug;

use crate::error::{NormalizeError, Result};

/// Default target format: four-digit year.
pub const DEFAULT_DATE_FORMAT: &str = "%Y";

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 9999;

/// Parse a cell into a calendar date.
///
/// Year-only values map to January 1st of that year.
pub fn parse_date_cell(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(date) => Some(date.date()),
        CellValue::Number(value) => year_from_number(*value),
        CellValue::Text(text) => parse_date(text),
        CellValue::List(values) if values.len() == 1 => parse_date(&values[0]),
        CellValue::List(_) | CellValue::Boolean(_) | CellValue::Missing => None,
    }
}

/// Parse a date string in any of the supported layouts.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    try_parse_datetime(trimmed)
        .map(|datetime| datetime.date())
        .or_else(|| try_parse_date(trimmed))
        .or_else(|| try_parse_partial(trimmed))
}

/// Normalize a column to dates rendered with `target_format`.
///
/// Single-element lists are unwrapped first. Cells that do not parse keep
/// their original value.
pub fn to_date(mut table: Table, column: &str, target_format: &str) -> Result<Table> {
    if !table.has_column(column) {
        return Err(NormalizeError::ColumnNotFound(column.to_string()));
    }
    let sample = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    if DateValue::format(sample, target_format).is_none() {
        return Err(NormalizeError::InvalidDateFormat(target_format.to_string()));
    }

    let mut parsed = 0usize;
    let mut unparsed = 0usize;
    table.map_column(column, |cell| {
        let cell = unwrap_singleton(cell);
        if cell.is_missing() {
            return cell;
        }
        match parse_date_cell(&cell).and_then(|date| DateValue::format(date, target_format)) {
            Some(date) => {
                parsed += 1;
                CellValue::Date(date)
            }
            None => {
                unparsed += 1;
                cell
            }
        }
    })?;
    debug!(column, parsed, unparsed, format = target_format, "normalized dates");
    Ok(table)
}

fn unwrap_singleton(cell: CellValue) -> CellValue {
    match cell {
        CellValue::List(mut values) if values.len() == 1 => {
            CellValue::Text(values.pop().unwrap_or_default())
        }
        other => other,
    }
}

fn year_from_number(value: f64) -> Option<NaiveDate> {
    if value.fract() != 0.0 || !value.is_finite() {
        return None;
    }
    let year = value as i64;
    let year = i32::try_from(year).ok()?;
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        NaiveDate::from_ymd_opt(year, 1, 1)
    } else {
        None
    }
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];
    formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let formats = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%b-%Y",  // 18-Jul-2008
        "%d-%B-%Y",  // 18-July-2008
        "%d/%m/%Y",  // 18/07/2008
        "%m/%d/%Y",  // 07/18/2008
        "%d.%m.%Y",  // 18.07.2008
        "%d-%m-%Y",  // 18-07-2008
        "%b %d, %Y", // Jul 18, 2008
        "%B %d, %Y", // July 18, 2008
        "%d %b %Y",  // 18 Jul 2008
        "%d %B %Y",  // 18 July 2008
        "%Y%m%d",    // 20080718
    ];
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// `YYYY-MM`, `YYYY` and float-encoded years such as `2008.0`.
fn try_parse_partial(value: &str) -> Option<NaiveDate> {
    if let Some((year, month)) = value.split_once('-') {
        if year.len() == 4 && month.len() == 2 {
            let year = year.parse::<i32>().ok()?;
            let month = month.parse::<u32>().ok()?;
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
        return None;
    }
    if value.len() == 4 && value.chars().all(|ch| ch.is_ascii_digit()) {
        let year = value.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).filter(|date| date.year() >= MIN_YEAR);
    }
    value.parse::<f64>().ok().and_then(year_from_number)
}
