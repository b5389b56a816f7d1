use anyhow::{Context, Result};
use film_ingest::read_headers;
use tracing::info_span;

use film_cli::config::PipelineConfig;
use film_cli::pipeline::{RunOptions, RunResult, run};

use crate::cli::RunArgs;
use crate::summary::print_headers;

pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("pipeline", config = %args.config.display());
    let _guard = span.enter();
    let config = PipelineConfig::load(&args.config)?;
    let options = RunOptions {
        output_dir: args.output_dir.clone(),
        format: args.format.map(Into::into),
        parallel: args.parallel,
        dry_run: args.dry_run,
        interactive: args.interactive,
    };
    run(&config, &options)
}

pub fn run_headers(file: &std::path::Path) -> Result<()> {
    let headers =
        read_headers(file).with_context(|| format!("read headers of {}", file.display()))?;
    print_headers(&headers);
    Ok(())
}
