//! Boolean coercion for flag columns such as `winner`.

use film_model::{CellValue, Table};
use tracing::debug;

use crate::error::{NormalizeError, Result};

/// Maps `true_token` to `true` and `false_token` to `false` in `column`.
///
/// Text cells and single-element lists are compared after trimming; numbers
/// by their rendering, so `1`/`0` tokens match numeric flags. Other cells
/// are left untouched.
pub fn to_boolean(
    mut table: Table,
    column: &str,
    true_token: &str,
    false_token: &str,
) -> Result<Table> {
    if !table.has_column(column) {
        return Err(NormalizeError::ColumnNotFound(column.to_string()));
    }
    let mut converted = 0usize;
    table.map_column(column, |cell| {
        let token = match &cell {
            CellValue::Text(text) => Some(text.trim().to_string()),
            CellValue::List(values) if values.len() == 1 => Some(values[0].trim().to_string()),
            CellValue::Number(_) => Some(cell.render()),
            _ => None,
        };
        let Some(token) = token else {
            return cell;
        };
        if token == true_token {
            converted += 1;
            CellValue::Boolean(true)
        } else if token == false_token {
            converted += 1;
            CellValue::Boolean(false)
        } else {
            cell
        }
    })?;
    debug!(column, converted, "coerced boolean column");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use film_model::Row;

    use super::*;

    #[test]
    fn tokens_map_to_flags() {
        let table = Table::with_rows(
            vec!["winner".into()],
            vec![
                Row::new(vec![" True ".into()]),
                Row::new(vec!["False".into()]),
                Row::new(vec!["maybe".into()]),
                Row::new(vec![CellValue::Missing]),
                Row::new(vec![CellValue::list(["True"])]),
            ],
        )
        .unwrap();
        let table = to_boolean(table, "winner", "True", "False").unwrap();
        let column = table.column("winner").unwrap();
        assert_eq!(column[0], &CellValue::Boolean(true));
        assert_eq!(column[1], &CellValue::Boolean(false));
        assert_eq!(column[2], &CellValue::text("maybe"));
        assert_eq!(column[3], &CellValue::Missing);
        assert_eq!(column[4], &CellValue::Boolean(true));
    }

    #[test]
    fn numeric_flags() {
        let table = Table::with_rows(
            vec!["winner".into()],
            vec![Row::new(vec![CellValue::Number(1.0)]), Row::new(vec![CellValue::Number(0.0)])],
        )
        .unwrap();
        let table = to_boolean(table, "winner", "1", "0").unwrap();
        assert_eq!(table.cell(0, "winner"), Some(&CellValue::Boolean(true)));
        assert_eq!(table.cell(1, "winner"), Some(&CellValue::Boolean(false)));
    }

    #[test]
    fn unknown_column() {
        let err = to_boolean(Table::default(), "winner", "y", "n").unwrap_err();
        assert_eq!(err, NormalizeError::ColumnNotFound("winner".into()));
    }
}
