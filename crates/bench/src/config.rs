//! Configuration for the benchmark tool

use std::path::PathBuf;

use sortjudge_common::config::{ConfigError, ToolchainConfig, env_path};

/// Benchmark configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Compilers and launcher
    pub toolchain: ToolchainConfig,

    /// Per-run outputs, recreated on every run
    pub output_dir: PathBuf,

    /// Cached input and reference files, kept across runs
    pub fixture_dir: PathBuf,

    /// Directory holding `make_random_testcase` and `gcc_parallel_sort`
    pub reference_dir: PathBuf,

    /// Hostfile passed to the launcher
    pub hostfile: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            toolchain: ToolchainConfig::from_env()?,
            output_dir: env_path("BENCH_OUTPUT_DIR", "_bench_output"),
            fixture_dir: env_path("BENCH_FIXTURE_DIR", "testcase_benchmark"),
            reference_dir: env_path("REFERENCE_DIR", "reference"),
            hostfile: env_path("HOSTFILE", "hostfile"),
        })
    }
}
