//! Shared building blocks for the `bench` and `judge` tools.
//!
//! Both tools compile (or resolve) a submission, launch it under `mpirun`
//! once per trial with a wall-clock timeout, compare its output file with a
//! reference byte for byte, and print a verdict table.

pub mod compare;
pub mod compiler;
pub mod config;
pub mod console;
pub mod error;
pub mod executor;
pub mod telemetry;
pub mod verdict;

pub use compiler::Compiler;
pub use config::{ConfigError, ToolchainConfig};
pub use error::{HarnessError, HarnessResult};
pub use executor::{Executor, StdioMode, Trial};
pub use verdict::{TrialRecord, Verdict};
