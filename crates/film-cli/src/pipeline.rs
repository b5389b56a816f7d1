//! The cleaning pipeline: load and normalize sources, assemble datasets,
//! aggregate duplicates, export one file per dataset.

use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result, anyhow};
use film_ingest::{ExportFormat, export_table, load_table};
use film_match::{AggregateOptions, AggregateReport, Aggregator, ConflictPolicy};
use film_model::{Dataset, Table};
use film_normalize::normalize_source;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span, warn};

use crate::config::{DatasetConfig, PipelineConfig, SourceConfig};
use crate::logging::redact_value;
use crate::operator::PromptOperator;

/// Command-line overrides for one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub output_dir: Option<PathBuf>,
    pub format: Option<ExportFormat>,
    pub parallel: bool,
    pub dry_run: bool,
    /// Force the interactive policy on every dataset.
    pub interactive: bool,
}

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub dry_run: bool,
    pub sources: Vec<SourceSummary>,
    pub datasets: Vec<DatasetSummary>,
}

impl RunResult {
    /// True when any dataset left a duplicate bucket unresolved.
    pub fn has_unresolved(&self) -> bool {
        self.datasets
            .iter()
            .any(|dataset| dataset.report.has_unresolved())
    }
}

#[derive(Debug)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug)]
pub struct DatasetSummary {
    pub name: String,
    pub key_columns: Vec<String>,
    /// Rows appended from all sources.
    pub collected_rows: usize,
    /// Rows after list cells were expanded.
    pub exploded_rows: usize,
    pub report: AggregateReport,
    /// Rows removed after aggregation for missing key values.
    pub filtered_rows: usize,
    pub rows: usize,
    pub output: Option<PathBuf>,
}

struct Prepared {
    dataset: Dataset,
    options: AggregateOptions,
    collected_rows: usize,
    exploded_rows: usize,
}

struct Aggregated {
    dataset: Dataset,
    report: AggregateReport,
    collected_rows: usize,
    exploded_rows: usize,
    filtered_rows: usize,
}

/// Runs a whole pipeline file.
pub fn run(config: &PipelineConfig, options: &RunOptions) -> Result<RunResult> {
    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.dir.clone());
    let format = options.format.unwrap_or(config.output.format);

    let (tables, sources) = load_sources(&config.sources)?;
    let prepared = config
        .datasets
        .iter()
        .map(|dataset| prepare_dataset(dataset, &tables, options.interactive))
        .collect::<Result<Vec<_>>>()?;

    let interactive = prepared
        .iter()
        .any(|item| item.options.policy.is_interactive());
    let aggregated = if options.parallel && !interactive {
        aggregate_parallel(prepared)?
    } else {
        if options.parallel {
            info!("interactive policy configured, aggregating sequentially");
        }
        aggregate_sequential(prepared, interactive)?
    };

    if !options.dry_run {
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("create output directory {}", output_dir.display()))?;
    }
    let mut datasets = Vec::with_capacity(aggregated.len());
    for item in aggregated {
        let output = if options.dry_run {
            None
        } else {
            let path = export_table(&item.dataset.snapshot(), &output_dir, item.dataset.name(), format)
                .with_context(|| format!("export dataset '{}'", item.dataset.name()))?;
            Some(path)
        };
        datasets.push(DatasetSummary {
            name: item.dataset.name().to_string(),
            key_columns: item.dataset.key_columns().to_vec(),
            collected_rows: item.collected_rows,
            exploded_rows: item.exploded_rows,
            report: item.report,
            filtered_rows: item.filtered_rows,
            rows: item.dataset.len(),
            output,
        });
    }

    Ok(RunResult {
        output_dir,
        format,
        dry_run: options.dry_run,
        sources,
        datasets,
    })
}

/// Loads and normalizes every source in listed order.
pub fn load_sources(configs: &[SourceConfig]) -> Result<(Vec<Table>, Vec<SourceSummary>)> {
    let mut tables = Vec::with_capacity(configs.len());
    let mut summaries = Vec::with_capacity(configs.len());
    for source in configs {
        let span = info_span!("source", path = %source.path.display());
        let _guard = span.enter();
        let raw = load_table(&source.path)
            .with_context(|| format!("load source {}", source.path.display()))?;
        let table = normalize_source(raw, &source.recipe())
            .with_context(|| format!("normalize source {}", source.path.display()))?;
        info!(rows = table.height(), columns = ?table.columns(), "normalized source");
        summaries.push(SourceSummary {
            path: source.path.clone(),
            rows: table.height(),
            columns: table.width(),
        });
        tables.push(table);
    }
    Ok((tables, summaries))
}

fn prepare_dataset(config: &DatasetConfig, tables: &[Table], interactive: bool) -> Result<Prepared> {
    let mut dataset = Dataset::new(config.name.as_str(), &config.headers, &config.keys)
        .with_context(|| format!("create dataset '{}'", config.name))?;
    for table in tables {
        dataset
            .add_data(table)
            .with_context(|| format!("add source rows to dataset '{}'", config.name))?;
    }
    let collected_rows = dataset.len();
    if collected_rows == 0 {
        warn!(dataset = %config.name, "no source shares a header with this dataset");
    }
    dataset.explode();

    let mut options = config.aggregate_options();
    if interactive {
        options = options.with_policy(ConflictPolicy::Interactive);
    }
    Ok(Prepared {
        exploded_rows: dataset.len(),
        dataset,
        options,
        collected_rows,
    })
}

fn aggregate_sequential(prepared: Vec<Prepared>, interactive: bool) -> Result<Vec<Aggregated>> {
    let progress = progress_bar(prepared.len(), interactive);
    let mut aggregated = Vec::with_capacity(prepared.len());
    for item in prepared {
        progress.set_message(item.dataset.name().to_string());
        aggregated.push(aggregate_one(item)?);
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(aggregated)
}

/// One scoped worker per dataset; results keep the configured order.
fn aggregate_parallel(prepared: Vec<Prepared>) -> Result<Vec<Aggregated>> {
    let progress = progress_bar(prepared.len(), false);
    let results = thread::scope(|scope| {
        let handles: Vec<_> = prepared
            .into_iter()
            .map(|item| {
                let progress = progress.clone();
                scope.spawn(move || {
                    let result = aggregate_one(item);
                    progress.inc(1);
                    result
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    });
    progress.finish_and_clear();

    let mut aggregated = Vec::with_capacity(results.len());
    for result in results {
        let item = result.map_err(|_| anyhow!("aggregation worker panicked"))??;
        aggregated.push(item);
    }
    Ok(aggregated)
}

fn aggregate_one(item: Prepared) -> Result<Aggregated> {
    let name = item.dataset.name().to_string();
    let span = info_span!("dataset", name = %name);
    let _guard = span.enter();

    let drop_missing = item.options.drop_rows_with_missing_keys;
    let mut aggregator = Aggregator::new(item.options);
    if aggregator.options().policy.is_interactive() {
        aggregator = aggregator.with_operator(Box::new(PromptOperator));
    }
    let (mut dataset, report) = aggregator
        .aggregate_dataset(item.dataset)
        .with_context(|| format!("aggregate dataset '{name}'"))?;
    for merge in &report.fuzzy_merges {
        debug!(
            key = redact_value(&merge.key),
            into = redact_value(&merge.representative),
            score = merge.score,
            "merged similar key"
        );
    }

    let filtered_rows = if drop_missing {
        let keys = dataset.key_columns().to_vec();
        dataset
            .drop_unknown(&keys)
            .with_context(|| format!("filter dataset '{name}'"))?
    } else {
        0
    };
    info!(
        rows = dataset.len(),
        merged = report.merged_rows,
        unresolved = report.unresolved_buckets,
        "dataset ready"
    );
    Ok(Aggregated {
        dataset,
        report,
        collected_rows: item.collected_rows,
        exploded_rows: item.exploded_rows,
        filtered_rows,
    })
}

fn progress_bar(len: usize, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} aggregating [{bar:30}] {pos}/{len} {msg}")
    {
        bar.set_style(style);
    }
    bar
}
