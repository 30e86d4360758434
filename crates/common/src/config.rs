//! Toolchain configuration shared by both tools
//!
//! Values come from environment variables (optionally loaded from a `.env`
//! file) and fall back to the conventional MPI wrapper names.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default process launcher
pub const DEFAULT_LAUNCHER: &str = "mpirun";

/// Default MPI C compiler wrapper
pub const DEFAULT_MPICC: &str = "mpicc";

/// Default MPI C++ compiler wrapper
pub const DEFAULT_MPICXX: &str = "mpicxx";

/// Default tracing filter, quiet so the report stays readable
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// External programs used to build and launch submissions
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Process launcher (`mpirun`)
    pub launcher: PathBuf,
    /// C compiler wrapper
    pub mpicc: PathBuf,
    /// C++ compiler wrapper
    pub mpicxx: PathBuf,
    /// Tracing filter used when `RUST_LOG` is not set
    pub rust_log: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            launcher: PathBuf::from(DEFAULT_LAUNCHER),
            mpicc: PathBuf::from(DEFAULT_MPICC),
            mpicxx: PathBuf::from(DEFAULT_MPICXX),
            rust_log: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ToolchainConfig {
    /// Load toolchain paths from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            launcher: env_path("MPIRUN", DEFAULT_LAUNCHER),
            mpicc: env_path("MPICC", DEFAULT_MPICC),
            mpicxx: env_path("MPICXX", DEFAULT_MPICXX),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

/// Read a path-valued variable, falling back to `default`
pub fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(key).unwrap_or_else(|_| default.to_string()))
}

/// Read and parse a variable, falling back to `default` when unset
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Parse a positive, finite number of seconds
pub fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{raw} is not a number"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got {raw}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("timeout {raw} is out of range: {e}"))
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
