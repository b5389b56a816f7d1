//! Library side of the `film-clean` binary: pipeline files, logging setup
//! and the pipeline runner.

pub mod config;
pub mod logging;
pub mod operator;
pub mod pipeline;
