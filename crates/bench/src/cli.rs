//! Command-line arguments for `bench`

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sortjudge_common::config::parse_timeout;

use crate::size::DEFAULT_SIZES;

#[derive(Parser, Debug)]
#[command(
    name = "bench",
    about = "Benchmark an MPI sorting program over process counts and input sizes"
)]
pub struct Args {
    /// Path to executable or source file
    pub filename: PathBuf,

    /// Timeout on each test, in seconds
    #[arg(long, default_value = "60", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Number of processes
    #[arg(
        long = "np",
        num_args = 1..,
        default_values_t = [1u32, 2, 4, 8, 16, 32],
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub nps: Vec<u32>,

    /// Input size, in K, M, or G (bare numbers are bytes)
    #[arg(long = "size", num_args = 1.., default_values = DEFAULT_SIZES)]
    pub sizes: Vec<String>,

    /// Hostfile passed to the launcher (overrides HOSTFILE)
    #[arg(long)]
    pub hostfile: Option<PathBuf>,

    /// Remove an existing output directory without asking
    #[arg(short, long)]
    pub yes: bool,
}
