//! Conflict reconciliation between duplicate rows.

use film_model::{CellValue, Row};

use crate::error::Result;
use crate::policy::ConflictPolicy;

/// Operator decision for one conflicting pair of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Keep the first row as it is.
    KeepFirst,
    /// Keep the first row's key with the second row's attributes.
    KeepSecond,
    /// Merge both rows with the automatic rules.
    KeepBoth,
}

/// Two rows judged to be the same entity whose attributes disagree.
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'a> {
    pub key_columns: &'a [String],
    pub key: &'a [CellValue],
    /// Non-key column names, aligned with `first` and `second`.
    pub columns: &'a [String],
    pub first: &'a [CellValue],
    pub second: &'a [CellValue],
}

impl Conflict<'_> {
    /// Non-key columns whose values differ.
    pub fn differing_columns(&self) -> impl Iterator<Item = (&str, &CellValue, &CellValue)> {
        self.columns
            .iter()
            .zip(self.first.iter().zip(self.second))
            .filter(|(_, (first, second))| first != second)
            .map(|(name, (first, second))| (name.as_str(), first, second))
    }
}

/// Source of decisions for [`ConflictPolicy::Interactive`].
///
/// Implementations may block indefinitely. An error leaves the bucket
/// unresolved; aggregation carries on with the next bucket.
pub trait ConflictOperator: Send {
    fn resolve(&mut self, conflict: &Conflict<'_>) -> Result<Resolution>;
}

/// Automatic merge of two cells.
///
/// Gaps are filled, text and lists are unioned in order, numbers keep the
/// maximum. Differing booleans, differing dates and mixed kinds keep the
/// first value.
pub fn merge_automatic(first: CellValue, second: CellValue) -> CellValue {
    use CellValue::{Boolean, Date, List, Missing, Number, Text};

    if first == second {
        return first;
    }
    match (first, second) {
        (Missing, second) => second,
        (first, Missing) => first,
        (Number(a), Number(b)) => Number(a.max(b)),
        (Text(a), Text(b)) => union(vec![a], vec![b]),
        (Text(a), List(b)) => union(vec![a], b),
        (List(a), Text(b)) => union(a, vec![b]),
        (List(a), List(b)) => union(a, b),
        (Boolean(a), Boolean(_)) => Boolean(a),
        (Date(a), Date(_)) => Date(a),
        (first @ (Number(_) | Boolean(_) | Date(_)), Text(_) | List(_))
        | (first @ (Text(_) | List(_)), Number(_) | Boolean(_) | Date(_))
        | (first @ Number(_), Boolean(_) | Date(_))
        | (first @ Boolean(_), Number(_) | Date(_))
        | (first @ Date(_), Number(_) | Boolean(_)) => first,
    }
}

/// Keeps the cell with the longer rendering; the first wins ties.
pub fn merge_longest(first: CellValue, second: CellValue) -> CellValue {
    if second.is_missing() {
        return first;
    }
    if first.is_missing() {
        return second;
    }
    if second.render().chars().count() > first.render().chars().count() {
        second
    } else {
        first
    }
}

fn union(mut values: Vec<String>, extra: Vec<String>) -> CellValue {
    for value in extra {
        if !values.contains(&value) {
            values.push(value);
        }
    }
    CellValue::List(values)
}

/// Reconciles two rows of one bucket into a survivor.
///
/// `key_indices` are positions of the key columns; the survivor always keeps
/// the first row's key cells.
pub(crate) struct Reconciler<'a> {
    pub policy: ConflictPolicy,
    pub columns: &'a [String],
    pub key_indices: &'a [usize],
}

impl Reconciler<'_> {
    pub fn reconcile(
        &self,
        first: Row,
        second: Row,
        operator: Option<&mut (dyn ConflictOperator + '_)>,
    ) -> Result<Row> {
        let attribute_indices: Vec<usize> = (0..self.columns.len())
            .filter(|index| !self.key_indices.contains(index))
            .collect();
        if attribute_indices
            .iter()
            .all(|&index| first.cells[index] == second.cells[index])
        {
            return Ok(first);
        }

        match self.policy {
            ConflictPolicy::Automatic => {
                Ok(merge_rows(first, second, &attribute_indices, merge_automatic))
            }
            ConflictPolicy::KeepLongest => {
                Ok(merge_rows(first, second, &attribute_indices, merge_longest))
            }
            ConflictPolicy::Interactive => {
                let resolution = match operator {
                    Some(operator) => {
                        let pick = |row: &Row, indices: &[usize]| -> Vec<CellValue> {
                            indices.iter().map(|&index| row.cells[index].clone()).collect()
                        };
                        let key_columns: Vec<String> = self
                            .key_indices
                            .iter()
                            .map(|&index| self.columns[index].clone())
                            .collect();
                        let attribute_columns: Vec<String> = attribute_indices
                            .iter()
                            .map(|&index| self.columns[index].clone())
                            .collect();
                        let key = pick(&first, self.key_indices);
                        let first_values = pick(&first, &attribute_indices);
                        let second_values = pick(&second, &attribute_indices);
                        operator.resolve(&Conflict {
                            key_columns: &key_columns,
                            key: &key,
                            columns: &attribute_columns,
                            first: &first_values,
                            second: &second_values,
                        })?
                    }
                    None => Resolution::KeepBoth,
                };
                Ok(match resolution {
                    Resolution::KeepFirst => first,
                    Resolution::KeepSecond => {
                        let mut survivor = first;
                        for &index in &attribute_indices {
                            survivor.cells[index] = second.cells[index].clone();
                        }
                        survivor
                    }
                    Resolution::KeepBoth => {
                        merge_rows(first, second, &attribute_indices, merge_automatic)
                    }
                })
            }
        }
    }
}

fn merge_rows(
    mut first: Row,
    mut second: Row,
    attribute_indices: &[usize],
    rule: fn(CellValue, CellValue) -> CellValue,
) -> Row {
    for &index in attribute_indices {
        let a = std::mem::replace(&mut first.cells[index], CellValue::Missing);
        let b = std::mem::replace(&mut second.cells[index], CellValue::Missing);
        first.cells[index] = rule(a, b);
    }
    first
}

#[cfg(test)]
mod tests {
    use film_model::DateValue;

    use super::*;

    #[test]
    fn automatic_rules_by_kind() {
        assert_eq!(
            merge_automatic(CellValue::Number(7.9), CellValue::Number(8.5)),
            CellValue::Number(8.5)
        );
        assert_eq!(
            merge_automatic(CellValue::text("Drama"), CellValue::text("Crime")),
            CellValue::list(["Drama", "Crime"])
        );
        assert_eq!(
            merge_automatic(CellValue::list(["Drama", "Crime"]), CellValue::text("Crime")),
            CellValue::list(["Drama", "Crime"])
        );
        assert_eq!(
            merge_automatic(CellValue::Missing, CellValue::Boolean(true)),
            CellValue::Boolean(true)
        );
        assert_eq!(
            merge_automatic(CellValue::Boolean(false), CellValue::Boolean(true)),
            CellValue::Boolean(false)
        );
        assert_eq!(
            merge_automatic(CellValue::text("8.5"), CellValue::Number(9.0)),
            CellValue::text("8.5")
        );
    }

    #[test]
    fn differing_dates_and_mixed_kinds_keep_first() {
        let date = |text: &str| {
            let date = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap();
            CellValue::Date(DateValue::format(date, "%Y-%m-%d").unwrap())
        };
        assert_eq!(
            merge_automatic(date("1995-12-15"), date("1995-12-08")),
            date("1995-12-15")
        );
        assert_eq!(
            merge_automatic(date("1995-12-15"), CellValue::Number(1995.0)),
            date("1995-12-15")
        );
        assert_eq!(
            merge_automatic(CellValue::Boolean(true), CellValue::list(["yes"])),
            CellValue::Boolean(true)
        );
        assert_eq!(
            merge_automatic(CellValue::Number(8.0), CellValue::Boolean(false)),
            CellValue::Number(8.0)
        );
        assert_eq!(
            merge_automatic(CellValue::list(["Heat"]), date("1995-12-15")),
            CellValue::list(["Heat"])
        );
        assert_eq!(
            merge_automatic(date("1995-12-15"), CellValue::Missing),
            date("1995-12-15")
        );
    }

    #[test]
    fn longest_rendering_wins() {
        assert_eq!(
            merge_longest(CellValue::text("Nolan"), CellValue::text("Christopher Nolan")),
            CellValue::text("Christopher Nolan")
        );
        assert_eq!(
            merge_longest(CellValue::text("abc"), CellValue::text("xyz")),
            CellValue::text("abc")
        );
        assert_eq!(
            merge_longest(CellValue::text("abc"), CellValue::Missing),
            CellValue::text("abc")
        );
    }

    struct Pick(Resolution);

    impl ConflictOperator for Pick {
        fn resolve(&mut self, conflict: &Conflict<'_>) -> Result<Resolution> {
            assert_eq!(conflict.differing_columns().count(), 1);
            Ok(self.0)
        }
    }

    #[test]
    fn keep_second_retains_first_key() {
        let columns = vec!["movie_name".to_string(), "movie_rating".to_string()];
        let reconciler = Reconciler {
            policy: ConflictPolicy::Interactive,
            columns: &columns,
            key_indices: &[0],
        };
        let mut operator = Pick(Resolution::KeepSecond);
        let survivor = reconciler
            .reconcile(
                Row::new(vec!["Heat".into(), CellValue::Number(8.2)]),
                Row::new(vec!["Heat.".into(), CellValue::Number(7.0)]),
                Some(&mut operator),
            )
            .unwrap();
        assert_eq!(survivor.cells, vec![CellValue::text("Heat"), CellValue::Number(7.0)]);
    }
}
