//! CLI argument definitions for the film dataset cleaner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use film_ingest::ExportFormat;

#[derive(Parser)]
#[command(
    name = "film-clean",
    version,
    about = "Film dataset cleaner - normalize sources and merge duplicate entities",
    long_about = "Normalize raw film data sources into keyed datasets and merge duplicate\n\
                  movies, people and awards with fuzzy key matching.\n\n\
                  Sources and datasets are described in a TOML pipeline file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include cell values (titles, names) in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a pipeline file: load, normalize, aggregate and export.
    Run(RunArgs),

    /// Print the raw headers of a source file with their positions.
    Headers {
        /// CSV or TSV source file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Parser)]
pub struct RunArgs {
    /// Pipeline file describing sources and datasets.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output directory (overrides `[output] dir`).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Export format (overrides `[output] format`).
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// Aggregate independent datasets on worker threads.
    ///
    /// Ignored when any dataset uses the interactive policy.
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Aggregate and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Resolve every duplicate bucket with a terminal prompt.
    #[arg(long = "interactive")]
    pub interactive: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Tsv,
    Xlsx,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Tsv => ExportFormat::Tsv,
            FormatArg::Xlsx => ExportFormat::Xlsx,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
