//! Header renaming, placeholder dropping, multi-value splitting and ordering.

use std::collections::BTreeSet;

use film_model::{CellValue, HeaderOrder, Table};
use tracing::debug;

use crate::error::{NormalizeError, Result};

/// Prefix marking a source column the caller does not want to keep.
pub const PLACEHOLDER_PREFIX: char = '_';

/// Columns that hold a single primary value even when it contains a comma.
pub const DEFAULT_NO_SPLIT: &[&str] = &["movie_name", "person_name"];

/// Options for [`normalize`].
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Free-text columns that must stay scalar.
    pub no_split: BTreeSet<String>,
    /// Order used for plural folding and column ordering.
    pub header_order: HeaderOrder,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            no_split: DEFAULT_NO_SPLIT.iter().map(|name| (*name).to_string()).collect(),
            header_order: HeaderOrder::canonical(),
        }
    }
}

impl NormalizeOptions {
    /// Adds columns to the no-split set.
    #[must_use]
    pub fn with_no_split<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_split.extend(columns.into_iter().map(Into::into));
        self
    }
}

/// Renames a raw table's columns into the canonical schema.
///
/// `names` holds one replacement per current column position. Columns
/// renamed with a leading `_` are dropped, names are lower-cased and plural
/// variants of known headers folded, free-text columns are split into lists
/// on `,`/`;`, and the result is ordered by the canonical header order.
pub fn normalize<S: AsRef<str>>(
    mut table: Table,
    names: &[S],
    options: &NormalizeOptions,
) -> Result<Table> {
    if names.len() != table.width() {
        return Err(NormalizeError::SchemaMismatch {
            expected: table.width(),
            actual: names.len(),
        });
    }

    let raw: Vec<String> = names.iter().map(|name| name.as_ref().to_string()).collect();
    let keep: Vec<bool> = raw
        .iter()
        .map(|name| !name.starts_with(PLACEHOLDER_PREFIX))
        .collect();
    let dropped = keep.iter().filter(|kept| !**kept).count();

    // Placeholder names may repeat; stage them under unique names before
    // renaming. Kept names never start with the marker, so they cannot clash.
    let staged: Vec<String> = raw
        .iter()
        .zip(&keep)
        .enumerate()
        .map(|(index, (name, kept))| {
            if *kept {
                name.clone()
            } else {
                format!("{PLACEHOLDER_PREFIX}{index}")
            }
        })
        .collect();
    table.rename_columns(staged)?;
    let mut table = table.retain_columns(|name| !name.starts_with(PLACEHOLDER_PREFIX));

    let canonical: Vec<String> = table
        .columns()
        .iter()
        .map(|name| options.header_order.singularize(&name.to_lowercase()))
        .collect();
    table.rename_columns(canonical)?;

    let columns = table.columns().to_vec();
    let mut split = Vec::new();
    for column in &columns {
        if options.no_split.contains(column) || !holds_text(&table, column)? {
            continue;
        }
        table.map_column(column, split_cell)?;
        split.push(column.clone());
    }

    let order = options.header_order.sort(table.columns());
    let table = table.reorder(&order)?;
    debug!(
        columns = table.width(),
        dropped,
        split = ?split,
        "normalized headers"
    );
    Ok(table)
}

/// Splits a text cell on commas and semicolons into a trimmed list.
///
/// Blank text becomes `Missing`; non-text cells are returned unchanged.
pub fn split_cell(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Text(text) if text.trim().is_empty() => CellValue::Missing,
        CellValue::Text(text) => CellValue::List(
            text.split([',', ';'])
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        other => other,
    }
}

fn holds_text(table: &Table, column: &str) -> Result<bool> {
    Ok(table
        .column(column)?
        .iter()
        .any(|cell| matches!(cell, CellValue::Text(text) if !text.trim().is_empty())))
}

#[cfg(test)]
mod tests {
    use film_model::Row;

    use super::*;

    fn raw() -> Table {
        Table::with_rows(
            vec!["Movie_Title".into(), "Year".into(), "Director".into()],
            vec![
                Row::new(vec![
                    "Crouching Tiger, Hidden Dragon".into(),
                    CellValue::Number(2000.0),
                    "Ang Lee".into(),
                ]),
                Row::new(vec![
                    "The Matrix".into(),
                    CellValue::Number(1999.0),
                    "Lana Wachowski; Lilly Wachowski".into(),
                ]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn positions_drive_renaming() {
        let table = normalize(
            raw(),
            &["movie_name", "movie_date", "directors"],
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(table.columns(), ["movie_name", "movie_date", "director"]);
        assert_eq!(
            table.cell(0, "movie_name"),
            Some(&CellValue::text("Crouching Tiger, Hidden Dragon"))
        );
        assert_eq!(
            table.cell(1, "director"),
            Some(&CellValue::list(["Lana Wachowski", "Lilly Wachowski"]))
        );
        assert_eq!(table.cell(1, "movie_date"), Some(&CellValue::Number(1999.0)));
    }

    #[test]
    fn no_split_option_keeps_scalars() {
        let options = NormalizeOptions::default().with_no_split(["director"]);
        let table = normalize(raw(), &["movie_name", "movie_date", "director"], &options).unwrap();
        assert_eq!(table.cell(0, "director"), Some(&CellValue::text("Ang Lee")));
    }

    #[test]
    fn repeated_placeholders_are_dropped() {
        let table = Table::with_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec![Row::new(vec!["x".into(), "y".into(), "z".into()])],
        )
        .unwrap();
        let table = normalize(table, &["_", "Writers", "_"], &NormalizeOptions::default()).unwrap();
        assert_eq!(table.columns(), ["writer"]);
        assert_eq!(table.cell(0, "writer"), Some(&CellValue::list(["y"])));
    }

    #[test]
    fn duplicate_kept_names_fail() {
        let table = Table::new(vec!["a".into(), "b".into()]).unwrap();
        let err = normalize(table, &["actor", "actor"], &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::Model(_)));
    }

    #[test]
    fn split_cell_handles_blank_and_scalars() {
        assert_eq!(split_cell(CellValue::text("  ")), CellValue::Missing);
        assert_eq!(split_cell(CellValue::Number(3.0)), CellValue::Number(3.0));
        assert_eq!(
            split_cell(CellValue::text("Drama, ;Crime")),
            CellValue::list(["Drama", "Crime"])
        );
    }
}
