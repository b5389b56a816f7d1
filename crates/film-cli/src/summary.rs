use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use film_cli::pipeline::{DatasetSummary, RunResult};

pub fn print_summary(result: &RunResult) {
    if result.dry_run {
        println!("Dry run: nothing written");
    } else {
        println!("Output: {} ({})", result.output_dir.display(), result.format);
    }
    println!("Sources: {}", result.sources.len());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Keys"),
        header_cell("Collected"),
        header_cell("Exploded"),
        header_cell("Merged"),
        header_cell("Fuzzy"),
        header_cell("Unresolved"),
        header_cell("Rows"),
        header_cell("File"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 8, CellAlignment::Center);

    let mut total_collected = 0usize;
    let mut total_merged = 0usize;
    let mut total_unresolved = 0usize;
    let mut total_rows = 0usize;
    for summary in &result.datasets {
        total_collected += summary.collected_rows;
        total_merged += summary.report.merged_rows;
        total_unresolved += summary.report.unresolved_buckets;
        total_rows += summary.rows;
        table.add_row(dataset_row(summary));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_collected).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_merged).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_unresolved, Color::Red).add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    if result.has_unresolved() {
        eprintln!("Unresolved duplicates:");
        for summary in result
            .datasets
            .iter()
            .filter(|summary| summary.report.has_unresolved())
        {
            eprintln!(
                "- {}: {} bucket(s) kept their first row",
                summary.name, summary.report.unresolved_buckets
            );
        }
    }
}

/// Prints a source file's raw headers with their positions.
pub fn print_headers(headers: &[String]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Header")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, header) in headers.iter().enumerate() {
        table.add_row(vec![Cell::new(index), Cell::new(header)]);
    }
    println!("{table}");
}

fn dataset_row(summary: &DatasetSummary) -> Vec<Cell> {
    let fuzzy = summary.report.fuzzy_merges.len();
    vec![
        Cell::new(&summary.name)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.key_columns.join(", ")),
        Cell::new(summary.collected_rows),
        Cell::new(summary.exploded_rows),
        count_cell(summary.report.merged_rows, Color::Green),
        count_cell(fuzzy, Color::Yellow),
        count_cell(summary.report.unresolved_buckets, Color::Red),
        Cell::new(summary.rows),
        output_cell(summary.output.as_ref()),
    ]
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn output_cell(path: Option<&PathBuf>) -> Cell {
    match path {
        Some(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
