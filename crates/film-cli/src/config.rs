//! TOML pipeline file: sources to normalize and datasets to build.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use film_ingest::ExportFormat;
use film_match::{AggregateOptions, ConflictPolicy, DEFAULT_THRESHOLD, ReconcileScope};
use film_normalize::{BooleanTokens, DEFAULT_DATE_FORMAT, SourceRecipe};
use serde::Deserialize;

/// A parsed pipeline file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub output: OutputConfig,
    pub sources: Vec<SourceConfig>,
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub format: ExportFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: ExportFormat::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("cleaned_data")
}

/// One raw source file and how to rename and coerce its columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub names: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub no_split: Vec<String>,
    #[serde(default)]
    pub booleans: Vec<BooleanTokens>,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl SourceConfig {
    pub fn recipe(&self) -> SourceRecipe {
        SourceRecipe {
            names: self.names.clone(),
            dates: self.dates.clone(),
            date_format: self.date_format.clone(),
            no_split: self.no_split.clone(),
            booleans: self.booleans.clone(),
        }
    }
}

/// A keyed output dataset and its aggregation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    pub name: String,
    pub headers: Vec<String>,
    pub keys: Vec<String>,
    #[serde(default)]
    pub policy: ConflictPolicy,
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default = "default_true")]
    pub drop_rows_with_missing_keys: bool,
    #[serde(default)]
    pub strict_timestamp_equality: bool,
    #[serde(default)]
    pub reconcile_scope: ReconcileScope,
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl DatasetConfig {
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions::new(self.keys.iter().cloned())
            .with_policy(self.policy)
            .with_threshold(self.threshold)
            .with_drop_rows_with_missing_keys(self.drop_rows_with_missing_keys)
            .with_strict_timestamp_equality(self.strict_timestamp_equality)
            .with_reconcile_scope(self.reconcile_scope)
    }
}

impl PipelineConfig {
    /// Reads and validates a pipeline file.
    ///
    /// Relative source and output paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read pipeline file {}", path.display()))?;
        let mut config = Self::parse(&contents)
            .with_context(|| format!("parse pipeline file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_paths(base);
        Ok(config)
    }

    /// Parses and validates pipeline TOML without touching the filesystem.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        if self.output.dir.is_relative() {
            self.output.dir = base.join(&self.output.dir);
        }
        for source in &mut self.sources {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
    }

    /// True when any dataset resolves conflicts through the operator.
    pub fn has_interactive_policy(&self) -> bool {
        self.datasets
            .iter()
            .any(|dataset| dataset.policy.is_interactive())
    }

    fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("pipeline lists no sources");
        }
        if self.datasets.is_empty() {
            bail!("pipeline lists no datasets");
        }
        let mut names = BTreeSet::new();
        for dataset in &self.datasets {
            if !names.insert(dataset.name.as_str()) {
                bail!("dataset '{}' is declared twice", dataset.name);
            }
            if dataset.keys.is_empty() {
                bail!("dataset '{}' declares no key columns", dataset.name);
            }
            if let Some(key) = dataset.keys.iter().find(|key| !dataset.headers.contains(key)) {
                bail!(
                    "dataset '{}' uses key '{key}' that is not one of its headers",
                    dataset.name
                );
            }
            dataset
                .aggregate_options()
                .validate()
                .with_context(|| format!("dataset '{}'", dataset.name))?;
        }
        Ok(())
    }
}
