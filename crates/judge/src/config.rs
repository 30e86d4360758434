//! Configuration for the judge tool

use std::path::PathBuf;

use sortjudge_common::config::{ConfigError, ToolchainConfig, env_parse, env_path};

/// Number of fixed test cases shipped with the assignment
pub const DEFAULT_TESTCASE_COUNT: u32 = 10;

/// Judge configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Compilers and launcher
    pub toolchain: ToolchainConfig,

    /// Per-run outputs, wiped on every run
    pub output_dir: PathBuf,

    /// Inputs, expected outputs and submit scripts
    pub testcase_dir: PathBuf,

    /// Number of submit scripts to read when no manifest exists
    pub testcase_count: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            toolchain: ToolchainConfig::from_env()?,
            output_dir: env_path("JUDGE_OUTPUT_DIR", "_judge_output"),
            testcase_dir: env_path("TESTCASE_DIR", "testcase"),
            testcase_count: env_parse("JUDGE_TESTCASE_COUNT", DEFAULT_TESTCASE_COUNT)?,
        })
    }
}
