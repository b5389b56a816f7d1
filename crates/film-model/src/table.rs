#![deny(unsafe_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::value::CellValue;

/// One table row; cells are aligned with the owning table's columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

impl From<Vec<CellValue>> for Row {
    fn from(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }
}

/// Ordered, uniquely named columns over positional rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Result<Self> {
        ensure_unique(&columns)?;
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Builds a table from rows already known to match `columns`.
    pub(crate) fn from_raw(columns: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|row| row.cells.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: impl Into<Row>) -> Result<()> {
        let row = row.into();
        if row.cells.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                expected: self.columns.len(),
                actual: row.cells.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ModelError::ColumnNotFound(name.to_string()))
    }

    /// All cells of a column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&CellValue>> {
        let index = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row.cells[index]).collect())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|row| row.cells.get(index))
    }

    /// Replaces every column name; names are matched by position.
    pub fn rename_columns(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                expected: self.columns.len(),
                actual: names.len(),
            });
        }
        ensure_unique(&names)?;
        self.columns = names;
        Ok(())
    }

    /// Keeps the columns for which `keep` returns true, in their current order.
    pub fn retain_columns(self, mut keep: impl FnMut(&str) -> bool) -> Self {
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| keep(name))
            .map(|(index, _)| index)
            .collect();
        self.project(&kept)
    }

    /// Projects the table onto `names`, in that order.
    pub fn select(self, names: &[String]) -> Result<Self> {
        ensure_unique(names)?;
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            indices.push(self.require_column(name)?);
        }
        Ok(self.project(&indices))
    }

    /// Reorders columns; `order` must be a permutation of the current names.
    pub fn reorder(self, order: &[String]) -> Result<Self> {
        if order.len() != self.columns.len() {
            return Err(ModelError::RowWidth {
                expected: self.columns.len(),
                actual: order.len(),
            });
        }
        self.select(order)
    }

    /// Rewrites every cell of one column in place.
    pub fn map_column(
        &mut self,
        name: &str,
        mut apply: impl FnMut(CellValue) -> CellValue,
    ) -> Result<()> {
        let index = self.require_column(name)?;
        for row in &mut self.rows {
            let cell = std::mem::replace(&mut row.cells[index], CellValue::Missing);
            row.cells[index] = apply(cell);
        }
        Ok(())
    }

    pub fn retain_rows(&mut self, keep: impl FnMut(&Row) -> bool) {
        self.rows.retain(keep);
    }

    fn project(self, indices: &[usize]) -> Self {
        let columns = indices
            .iter()
            .map(|&index| self.columns[index].clone())
            .collect();
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| {
                let cells = indices
                    .iter()
                    .map(|&index| std::mem::replace(&mut row.cells[index], CellValue::Missing))
                    .collect();
                Row { cells }
            })
            .collect();
        Self { columns, rows }
    }
}

fn ensure_unique(names: &[String]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ModelError::DuplicateColumn(name.clone()));
        }
    }
    Ok(())
}
