//! End-to-end pipeline runs over temporary source files.

use std::fs;
use std::path::Path;

use film_cli::config::PipelineConfig;
use film_cli::pipeline::{RunOptions, RunResult, run};
use film_ingest::{ExportFormat, load_table};
use film_model::CellValue;

const MOVIES: &str = "Title,Year,Rating,Genre\n\
                      Heat,1995,8.2,\"Crime, Drama\"\n\
                      Alien,1979,8.4,Horror\n";

const CREDITS: &str = "name\tyear\tdirector\n\
                       Heat \t1995\tMichael Mann\n\
                       Alien\t1979\tRidley Scott\n";

const PIPELINE: &str = r#"
[output]
dir = "cleaned"

[[sources]]
path = "movies.csv"
names = ["movie_name", "movie_date", "movie_rating", "movie_genre"]
dates = ["movie_date"]

[[sources]]
path = "credits.tsv"
names = ["movie_name", "movie_date", "director"]
dates = ["movie_date"]

[[datasets]]
name = "movie"
headers = ["movie_name", "movie_date", "movie_rating", "director"]
keys = ["movie_name", "movie_date"]

[[datasets]]
name = "genre"
headers = ["movie_name", "movie_date", "movie_genre"]
keys = ["movie_name", "movie_genre"]
"#;

fn write_fixture(dir: &Path) -> PipelineConfig {
    fs::write(dir.join("movies.csv"), MOVIES).expect("write movies");
    fs::write(dir.join("credits.tsv"), CREDITS).expect("write credits");
    let path = dir.join("pipeline.toml");
    fs::write(&path, PIPELINE).expect("write pipeline");
    PipelineConfig::load(&path).expect("load pipeline")
}

fn rows_per_dataset(result: &RunResult) -> Vec<(String, usize)> {
    result
        .datasets
        .iter()
        .map(|dataset| (dataset.name.clone(), dataset.rows))
        .collect()
}

#[test]
fn pipeline_merges_sources_and_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path());

    let result = run(&config, &RunOptions::default()).expect("run pipeline");
    assert!(!result.has_unresolved());
    assert_eq!(result.sources.len(), 2);
    assert_eq!(result.output_dir, dir.path().join("cleaned"));

    let movie = &result.datasets[0];
    assert_eq!(movie.name, "movie");
    assert_eq!(movie.collected_rows, 4);
    assert_eq!(movie.rows, 2);
    assert_eq!(movie.report.merged_rows, 2);

    let exported = movie.output.as_ref().expect("movie file");
    assert_eq!(exported, &dir.path().join("cleaned").join("movie.csv"));
    let table = load_table(exported).expect("load export");
    assert_eq!(table.height(), 2);
    let heat = table
        .column("movie_name")
        .expect("movie_name")
        .iter()
        .position(|cell| **cell == CellValue::text("Heat"))
        .expect("Heat row");
    assert_eq!(
        table.cell(heat, "director"),
        Some(&CellValue::text("Michael Mann"))
    );
    assert_eq!(table.cell(heat, "movie_rating"), Some(&CellValue::Number(8.2)));
}

#[test]
fn exploded_genres_keep_one_row_each() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path());

    let result = run(&config, &RunOptions::default()).expect("run pipeline");
    let genre = &result.datasets[1];
    assert_eq!(genre.collected_rows, 4);
    assert_eq!(genre.exploded_rows, 5);
    assert_eq!(genre.report.dropped_missing_keys, 2);
    assert_eq!(genre.rows, 3);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path());
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let result = run(&config, &options).expect("run pipeline");
    assert!(result.datasets.iter().all(|dataset| dataset.output.is_none()));
    assert!(!dir.path().join("cleaned").exists());
}

#[test]
fn parallel_run_matches_sequential_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path());
    let dry = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };
    let sequential = run(&config, &dry).expect("sequential");
    let parallel = run(
        &config,
        &RunOptions {
            parallel: true,
            ..dry
        },
    )
    .expect("parallel");
    assert_eq!(rows_per_dataset(&sequential), rows_per_dataset(&parallel));
}

#[test]
fn command_line_overrides_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_fixture(dir.path());
    let elsewhere = dir.path().join("elsewhere");
    let options = RunOptions {
        output_dir: Some(elsewhere.clone()),
        format: Some(ExportFormat::Tsv),
        ..RunOptions::default()
    };

    let result = run(&config, &options).expect("run pipeline");
    assert!(elsewhere.join("movie.tsv").is_file());
    assert!(elsewhere.join("genre.tsv").is_file());
    assert_eq!(result.format, ExportFormat::Tsv);
}

#[test]
fn missing_source_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = write_fixture(dir.path());
    config.sources[1].path = dir.path().join("absent.tsv");

    let err = run(&config, &RunOptions::default()).expect_err("missing source");
    assert!(format!("{err:#}").contains("absent.tsv"));
}

#[test]
fn demo_pipeline_runs_dry() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/pipeline.toml");
    let config = PipelineConfig::load(&path).expect("load demo pipeline");
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let result = run(&config, &options).expect("run demo pipeline");
    let names: Vec<&str> = result
        .datasets
        .iter()
        .map(|dataset| dataset.name.as_str())
        .collect();
    assert_eq!(names, ["movie", "person", "award"]);
    assert!(!result.has_unresolved());
}
