//! bench - performance sweep for MPI sorting programs
//!
//! Compiles (or resolves) a submission, makes sure a cached random input and
//! its sorted reference exist for every requested size, then runs the
//! program under `mpirun` for every size × process-count pair and prints a
//! timing table.

mod cli;
mod config;
mod fixture;
mod report;
mod runner;
mod size;

use anyhow::Result;
use clap::Parser;

use crate::cli::Args;
use crate::config::Config;
use crate::runner::BenchRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    sortjudge_common::telemetry::init(&config.toolchain.rust_log);
    tracing::debug!(?args, "Starting bench");

    if let Err(e) = BenchRunner::new(args, config).run().await {
        tracing::error!(code = e.error_code(), "bench aborted");
        return Err(e.into());
    }

    Ok(())
}
