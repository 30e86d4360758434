//! Command-line arguments for `judge`

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sortjudge_common::config::parse_timeout;

#[derive(Parser, Debug)]
#[command(
    name = "judge",
    about = "Judge an MPI sorting program against the fixed test cases"
)]
pub struct Args {
    /// Path to executable or source file
    pub filename: PathBuf,

    /// Timeout on each test, in seconds
    #[arg(long, default_value = "60", value_parser = parse_timeout)]
    pub timeout: Duration,
}
