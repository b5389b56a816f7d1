//! Per-source normalization recipe.

use film_model::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boolean::to_boolean;
use crate::columns::{NormalizeOptions, normalize};
use crate::date::{DEFAULT_DATE_FORMAT, to_date};
use crate::error::Result;

/// Pair of tokens mapped onto `true`/`false` in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BooleanTokens {
    pub column: String,
    pub true_token: String,
    pub false_token: String,
}

/// Everything needed to bring one raw source into the canonical schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceRecipe {
    /// One replacement name per source column; `_` drops the column.
    pub names: Vec<String>,
    /// Columns coerced to dates after renaming.
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Extra columns kept scalar on top of the default set.
    #[serde(default)]
    pub no_split: Vec<String>,
    #[serde(default)]
    pub booleans: Vec<BooleanTokens>,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl SourceRecipe {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            dates: Vec::new(),
            date_format: default_date_format(),
            no_split: Vec::new(),
            booleans: Vec::new(),
        }
    }

    pub fn options(&self) -> NormalizeOptions {
        NormalizeOptions::default().with_no_split(self.no_split.iter().cloned())
    }
}

/// Applies [`normalize`], then date and boolean coercion.
///
/// Date and boolean columns the renamed table does not carry are skipped.
pub fn normalize_source(table: Table, recipe: &SourceRecipe) -> Result<Table> {
    let mut table = normalize(table, &recipe.names, &recipe.options())?;
    for column in &recipe.dates {
        if !table.has_column(column) {
            debug!(column = %column, "date column absent from source, skipping");
            continue;
        }
        table = to_date(table, column, &recipe.date_format)?;
    }
    for tokens in &recipe.booleans {
        if !table.has_column(&tokens.column) {
            debug!(column = %tokens.column, "boolean column absent from source, skipping");
            continue;
        }
        table = to_boolean(table, &tokens.column, &tokens.true_token, &tokens.false_token)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use film_model::{CellValue, Row};

    use super::*;

    #[test]
    fn recipe_applies_dates_and_flags() {
        let table = Table::with_rows(
            vec!["year_ceremony".into(), "name".into(), "film".into(), "winner".into()],
            vec![Row::new(vec![
                CellValue::Number(1995.0),
                "Al Pacino".into(),
                "Scent of a Woman".into(),
                "True".into(),
            ])],
        )
        .unwrap();
        let mut recipe = SourceRecipe::new(["award_year", "person_name", "movie_name", "winner"]);
        recipe.dates = vec!["award_year".into(), "movie_date".into()];
        recipe.booleans = vec![BooleanTokens {
            column: "winner".into(),
            true_token: "True".into(),
            false_token: "False".into(),
        }];

        let table = normalize_source(table, &recipe).unwrap();
        assert_eq!(table.columns(), ["movie_name", "award_year", "person_name", "winner"]);
        assert_eq!(table.cell(0, "award_year").unwrap().render(), "1995");
        assert!(table.cell(0, "award_year").unwrap().is_date());
        assert_eq!(table.cell(0, "winner"), Some(&CellValue::Boolean(true)));
    }
}
