//! judge - correctness check for MPI sorting programs
//!
//! Compiles (or resolves) a submission and runs it under `mpirun` against
//! the fixed test cases, comparing each output with its sorted reference.

mod cli;
mod config;
mod report;
mod runner;
mod testcase;

use anyhow::Result;
use clap::Parser;

use crate::cli::Args;
use crate::config::Config;
use crate::runner::JudgeRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    sortjudge_common::telemetry::init(&config.toolchain.rust_log);
    tracing::debug!(?args, "Starting judge");

    if let Err(e) = JudgeRunner::new(args, config).run().await {
        tracing::error!(code = e.error_code(), "judge aborted");
        return Err(e.into());
    }

    Ok(())
}
