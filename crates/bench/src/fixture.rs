//! Benchmark fixtures - generation and caching
//!
//! Generating a multi-gigabyte input and sorting it with the reference
//! sorter is expensive, so both files are kept in the fixture directory and
//! reused as long as their length matches the requested size.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::process::Command;

use sortjudge_common::compare::file_len;
use sortjudge_common::console::{print_command, quote_command};
use sortjudge_common::{HarnessError, HarnessResult};

use crate::size::SizeSpec;

/// Random input generator in the reference directory
pub const GENERATOR: &str = "make_random_testcase";

/// Reference sorter in the reference directory
pub const REFERENCE_SORTER: &str = "gcc_parallel_sort";

/// Input / expected-output pair for one size
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Random unsorted input
    pub input: PathBuf,
    /// Sorted reference output
    pub sorted: PathBuf,
}

/// Fixture manager handles generation and caching
pub struct FixtureManager {
    fixture_dir: PathBuf,
    reference_dir: PathBuf,
}

impl FixtureManager {
    /// Create a new fixture manager
    pub fn new(fixture_dir: impl Into<PathBuf>, reference_dir: impl Into<PathBuf>) -> Self {
        Self {
            fixture_dir: fixture_dir.into(),
            reference_dir: reference_dir.into(),
        }
    }

    /// Create the fixture directory if it does not exist yet
    pub async fn prepare(&self) -> HarnessResult<()> {
        fs::create_dir_all(&self.fixture_dir).await?;
        Ok(())
    }

    /// Paths of the fixture for `size`, without touching the filesystem
    pub fn paths(&self, size: &SizeSpec) -> Fixture {
        Fixture {
            input: self.fixture_dir.join(format!("testcase_{}", size.label)),
            sorted: self.fixture_dir.join(format!("sorted_{}", size.label)),
        }
    }

    /// Return the fixture for `size`, regenerating whichever file is stale
    pub async fn ensure(&self, size: &SizeSpec) -> HarnessResult<Fixture> {
        let fixture = self.paths(size);
        let expected_len = size.byte_len();

        if needs_regeneration(&fixture.input, expected_len).await? {
            tracing::info!(size = %size.label, "Generating random input");
            self.run_tool(
                GENERATOR,
                vec![fixture.input.clone().into(), size.int_count.to_string().into()],
            )
            .await?;
        } else {
            tracing::debug!(size = %size.label, "Using cached input");
        }

        if needs_regeneration(&fixture.sorted, expected_len).await? {
            tracing::info!(size = %size.label, "Generating sorted reference");
            self.run_tool(
                REFERENCE_SORTER,
                vec![
                    size.int_count.to_string().into(),
                    fixture.input.clone().into(),
                    fixture.sorted.clone().into(),
                ],
            )
            .await?;
        } else {
            tracing::debug!(size = %size.label, "Using cached reference");
        }

        Ok(fixture)
    }

    async fn run_tool(&self, tool: &str, args: Vec<OsString>) -> HarnessResult<()> {
        let mut argv: Vec<OsString> = vec![self.reference_dir.join(tool).into()];
        argv.extend(args);
        print_command(&argv);

        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .status()
            .await
            .map_err(|source| HarnessError::Spawn {
                program: argv[0].to_string_lossy().into_owned(),
                source,
            })?;

        if !status.success() {
            return Err(HarnessError::ReferenceToolFailed(format!(
                "{} ({})",
                quote_command(&argv),
                status
            )));
        }
        Ok(())
    }
}

/// A fixture file is rebuilt iff it is absent or its length is wrong
pub async fn needs_regeneration(path: &Path, expected_len: u64) -> HarnessResult<bool> {
    Ok(file_len(path).await? != Some(expected_len))
}
