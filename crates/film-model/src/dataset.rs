//! Keyed datasets assembled from several normalized sources.

use tracing::debug;

use crate::error::{ModelError, Result};
use crate::header::HeaderOrder;
use crate::table::{Row, Table};
use crate::value::CellValue;

/// A named table with a declared header set and the key columns that define
/// entity identity (e.g. `movie_name` + `movie_date` for movies).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    key_columns: Vec<String>,
    table: Table,
}

impl Dataset {
    /// Creates an empty dataset. Headers are stored in canonical order.
    pub fn new<S: AsRef<str>>(name: impl Into<String>, headers: &[S], keys: &[S]) -> Result<Self> {
        let name = name.into();
        let headers = HeaderOrder::canonical().sort(headers);
        let key_columns: Vec<String> = keys.iter().map(|key| key.as_ref().to_string()).collect();
        let table = Table::new(headers)?;
        Self::from_parts(name, key_columns, table)
    }

    /// Reassembles a dataset around an existing table.
    pub fn from_parts(name: String, key_columns: Vec<String>, table: Table) -> Result<Self> {
        if key_columns.is_empty() {
            return Err(ModelError::NoKeyColumns(name));
        }
        if let Some(column) = key_columns.iter().find(|key| !table.has_column(key)) {
            return Err(ModelError::UnknownKeyColumn {
                dataset: name,
                column: column.clone(),
            });
        }
        Ok(Self {
            name,
            key_columns,
            table,
        })
    }

    pub fn into_parts(self) -> (String, Vec<String>, Table) {
        (self.name, self.key_columns, self.table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        self.table.columns()
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.height()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Appends the rows of `source`, restricted to the declared headers.
    ///
    /// Headers the source lacks are filled with `Missing`. Returns the number
    /// of appended rows; a source sharing no header contributes nothing.
    pub fn add_data(&mut self, source: &Table) -> Result<usize> {
        let positions: Vec<Option<usize>> = self
            .table
            .columns()
            .iter()
            .map(|header| source.column_index(header))
            .collect();
        if positions.iter().all(Option::is_none) {
            debug!(dataset = %self.name, "source shares no header with dataset");
            return Ok(0);
        }
        for row in source.rows() {
            let cells = positions
                .iter()
                .map(|position| match position {
                    Some(index) => row.cells[*index].clone(),
                    None => CellValue::Missing,
                })
                .collect::<Vec<_>>();
            self.table.push_row(cells)?;
        }
        debug!(
            dataset = %self.name,
            rows = source.height(),
            shared = positions.iter().filter(|p| p.is_some()).count(),
            "added source rows"
        );
        Ok(source.height())
    }

    /// Expands list cells into one row per element, one column at a time.
    ///
    /// Several list columns in one row therefore produce their cartesian
    /// product; an empty list becomes a single `Missing` cell.
    pub fn explode(&mut self) {
        let before = self.table.height();
        let columns = self.table.columns().to_vec();
        let mut rows = std::mem::take(&mut self.table).into_rows();
        for index in 0..columns.len() {
            if !rows
                .iter()
                .any(|row| matches!(row.cells[index], CellValue::List(_)))
            {
                continue;
            }
            rows = rows
                .into_iter()
                .flat_map(|row| explode_row(row, index))
                .collect();
        }
        self.table = Table::from_raw(columns, rows);
        debug!(dataset = %self.name, before, after = self.table.height(), "exploded list cells");
    }

    /// Drops rows where any of `columns` is missing.
    pub fn drop_unknown<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<usize> {
        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            indices.push(self.table.require_column(column.as_ref())?);
        }
        let before = self.table.height();
        self.table
            .retain_rows(|row| indices.iter().all(|&index| !row.cells[index].is_missing()));
        let dropped = before - self.table.height();
        if dropped > 0 {
            debug!(dataset = %self.name, dropped, "dropped rows with unknown values");
        }
        Ok(dropped)
    }

    /// Immutable export view in canonical header order.
    pub fn snapshot(&self) -> Table {
        let order = HeaderOrder::canonical().sort(self.table.columns());
        self.table
            .clone()
            .reorder(&order)
            .unwrap_or_else(|_| self.table.clone())
    }
}

fn explode_row(mut row: Row, index: usize) -> Vec<Row> {
    match std::mem::replace(&mut row.cells[index], CellValue::Missing) {
        CellValue::List(values) if values.is_empty() => vec![row],
        CellValue::List(values) => values
            .into_iter()
            .map(|value| {
                let mut exploded = row.clone();
                exploded.cells[index] = CellValue::Text(value);
                exploded
            })
            .collect(),
        other => {
            row.cells[index] = other;
            vec![row]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Table {
        Table::with_rows(
            vec!["movie_name".into(), "actor".into(), "movie_budget".into()],
            vec![
                Row::new(vec![
                    "Heat".into(),
                    CellValue::list(["Al Pacino", "Robert De Niro"]),
                    CellValue::Number(60.0),
                ]),
                Row::new(vec![
                    "Alien".into(),
                    CellValue::list(Vec::<String>::new()),
                    CellValue::Missing,
                ]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn add_data_intersects_columns() {
        let mut dataset =
            Dataset::new("movie", &["actor", "movie_name", "movie_date"], &["movie_name"]).unwrap();
        assert_eq!(dataset.headers(), ["movie_name", "movie_date", "actor"]);
        assert_eq!(dataset.add_data(&source()).unwrap(), 2);
        assert_eq!(dataset.table().cell(0, "movie_date"), Some(&CellValue::Missing));
        assert!(!dataset.headers().contains(&"movie_budget".to_string()));
    }

    #[test]
    fn explode_grows_rows() {
        let mut dataset = Dataset::new("cast", &["movie_name", "actor"], &["movie_name"]).unwrap();
        dataset.add_data(&source()).unwrap();
        dataset.explode();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.table().cell(1, "actor"), Some(&CellValue::text("Robert De Niro")));
        assert_eq!(dataset.table().cell(2, "actor"), Some(&CellValue::Missing));
    }

    #[test]
    fn drop_unknown_removes_missing_keys() {
        let mut dataset = Dataset::new("cast", &["movie_name", "actor"], &["movie_name"]).unwrap();
        dataset.add_data(&source()).unwrap();
        dataset.explode();
        assert_eq!(dataset.drop_unknown(&["actor"]).unwrap(), 1);
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn rejects_undeclared_keys() {
        let err = Dataset::new("movie", &["movie_name"], &["movie_date"]).unwrap_err();
        assert!(matches!(err, ModelError::UnknownKeyColumn { .. }));
        let err = Dataset::new::<&str>("movie", &["movie_name"], &[]).unwrap_err();
        assert!(matches!(err, ModelError::NoKeyColumns(_)));
    }
}
