//! Integration tests for the column normalizer.

use film_model::{CellValue, Row, Table};
use film_normalize::{
    DEFAULT_DATE_FORMAT, NormalizeError, NormalizeOptions, SourceRecipe, normalize,
    normalize_source, to_date,
};

fn imdb_top() -> Table {
    Table::with_rows(
        vec!["Movie_Title".into(), "Year".into(), "Director".into()],
        vec![
            Row::new(vec!["Heat".into(), CellValue::Number(1995.0), "Michael Mann".into()]),
            Row::new(vec![
                "No Country for Old Men".into(),
                CellValue::Number(2007.0),
                "Ethan Coen, Joel Coen".into(),
            ]),
        ],
    )
    .expect("raw table")
}

#[test]
fn renames_orders_and_splits_only_free_text() {
    let table = normalize(
        imdb_top(),
        &["movie_name", "movie_date", "director"],
        &NormalizeOptions::default(),
    )
    .expect("normalize");

    assert_eq!(table.columns(), ["movie_name", "movie_date", "director"]);
    assert_eq!(table.cell(0, "movie_name"), Some(&CellValue::text("Heat")));
    assert_eq!(table.cell(0, "movie_date"), Some(&CellValue::Number(1995.0)));
    assert_eq!(table.cell(0, "director"), Some(&CellValue::list(["Michael Mann"])));
    assert_eq!(
        table.cell(1, "director"),
        Some(&CellValue::list(["Ethan Coen", "Joel Coen"]))
    );
}

#[test]
fn name_count_must_match_columns() {
    let err = normalize(
        imdb_top(),
        &["movie_name", "movie_date"],
        &NormalizeOptions::default(),
    )
    .expect_err("two names for three columns");
    assert_eq!(
        err,
        NormalizeError::SchemaMismatch {
            expected: 3,
            actual: 2
        }
    );
}

#[test]
fn mixed_case_plural_headers_are_canonicalized() {
    let table = Table::with_rows(
        vec!["Stars".into(), "Title".into()],
        vec![Row::new(vec!["Al Pacino; Robert De Niro".into(), "Heat".into()])],
    )
    .expect("raw table");
    let table = normalize(table, &["Actors", "Movie_Name"], &NormalizeOptions::default())
        .expect("normalize");
    assert_eq!(table.columns(), ["movie_name", "actor"]);
    assert_eq!(
        table.cell(0, "actor"),
        Some(&CellValue::list(["Al Pacino", "Robert De Niro"]))
    );
}

#[test]
fn dates_fail_open() {
    let table = Table::with_rows(
        vec!["movie_date".into()],
        vec![
            Row::new(vec!["July 18, 2008".into()]),
            Row::new(vec![CellValue::list(["1999-03-31"])]),
            Row::new(vec!["sometime in the nineties".into()]),
            Row::new(vec![CellValue::Missing]),
        ],
    )
    .expect("table");
    let table = to_date(table, "movie_date", DEFAULT_DATE_FORMAT).expect("to_date");
    let column = table.column("movie_date").expect("column");
    assert_eq!(column[0].render(), "2008");
    assert!(column[0].is_date());
    assert_eq!(column[1].render(), "1999");
    assert_eq!(column[2], &CellValue::text("sometime in the nineties"));
    assert_eq!(column[3], &CellValue::Missing);
}

#[test]
fn full_date_format_keeps_days() {
    let table = Table::with_rows(
        vec!["person_dateofbirth".into()],
        vec![Row::new(vec!["25 April 1940".into()])],
    )
    .expect("table");
    let table = to_date(table, "person_dateofbirth", "%Y-%m-%d").expect("to_date");
    assert_eq!(table.cell(0, "person_dateofbirth").expect("cell").render(), "1940-04-25");
}

#[test]
fn invalid_format_and_unknown_column_are_errors() {
    let table = Table::new(vec!["movie_date".into()]).expect("table");
    let err = to_date(table.clone(), "movie_date", "%Q").expect_err("bad format");
    assert!(matches!(err, NormalizeError::InvalidDateFormat(_)));
    let err = to_date(table, "release", DEFAULT_DATE_FORMAT).expect_err("unknown column");
    assert_eq!(err, NormalizeError::ColumnNotFound("release".into()));
}

#[test]
fn source_recipe_reads_from_toml() {
    let recipe: SourceRecipe = toml::from_str(
        r#"
        names = ["movie_name", "_", "movie_date", "director"]
        dates = ["movie_date"]
        no_split = ["director"]
        "#,
    )
    .expect("parse recipe");
    assert_eq!(recipe.date_format, DEFAULT_DATE_FORMAT);

    let raw = Table::with_rows(
        vec!["title".into(), "rank".into(), "year".into(), "director".into()],
        vec![Row::new(vec![
            "Heat".into(),
            CellValue::Number(12.0),
            "1995".into(),
            "Michael Mann".into(),
        ])],
    )
    .expect("raw table");
    let table = normalize_source(raw, &recipe).expect("normalize source");
    assert_eq!(table.columns(), ["movie_name", "movie_date", "director"]);
    assert_eq!(table.cell(0, "director"), Some(&CellValue::text("Michael Mann")));
    assert_eq!(table.cell(0, "movie_date").expect("cell").render(), "1995");
}

#[test]
fn source_recipe_rejects_unknown_fields() {
    let result: Result<SourceRecipe, _> = toml::from_str(
        r#"
        names = ["movie_name"]
        headers = ["movie_name"]
        "#,
    );
    assert!(result.is_err());
}
