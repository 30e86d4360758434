//! Judge test cases - descriptors and file layout
//!
//! Test cases live in one directory as `testcase<i>` (input) and
//! `sorted<i>` (expected output). Their launch parameters come from
//! `cases.json` when present, otherwise from the PBS submit scripts
//! `submit<i>.sh` that ship with the data.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tokio::fs;

use sortjudge_common::{HarnessError, HarnessResult};

/// Structured descriptor file name inside the test-case directory
pub const MANIFEST_FILE: &str = "cases.json";

static NODES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PBS -l nodes=(\d+):ppn=(\d+)").expect("valid regex"));

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mpiexec \./\$exe (\d+)").expect("valid regex"));

/// Launch parameters of one test case
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestCaseSpec {
    /// Test case number (1-indexed)
    pub number: u32,
    /// Nodes requested from the batch system
    pub nodes: u32,
    /// Processes per node
    pub ppn: u32,
    /// Element count passed to the program
    pub size: u64,
}

impl TestCaseSpec {
    /// Total process count passed as `-np`
    pub fn processes(&self) -> HarnessResult<u32> {
        self.nodes.checked_mul(self.ppn).ok_or_else(|| {
            HarnessError::TestCase(format!(
                "testcase{}: nodes={} ppn={} overflows the process count",
                self.number, self.nodes, self.ppn
            ))
        })
    }
}

/// Test case with resolved file paths
#[derive(Debug, Clone)]
pub struct TestCase {
    pub spec: TestCaseSpec,
    /// `nodes * ppn`, checked at load time
    pub processes: u32,
    /// Path to input file
    pub input_path: PathBuf,
    /// Path to expected output file
    pub expected_path: PathBuf,
}

/// Loads test-case descriptors from the test-case directory
pub struct TestCaseManager {
    dir: PathBuf,
    count: u32,
}

impl TestCaseManager {
    /// Create a new test case manager
    pub fn new(dir: impl Into<PathBuf>, count: u32) -> Self {
        Self {
            dir: dir.into(),
            count,
        }
    }

    /// Load every test case, preferring the structured manifest
    pub async fn load(&self) -> HarnessResult<Vec<TestCase>> {
        let manifest = self.dir.join(MANIFEST_FILE);
        let mut specs = if fs::try_exists(&manifest).await? {
            tracing::debug!(path = %manifest.display(), "Loading test case manifest");
            load_manifest(&manifest).await?
        } else {
            self.load_submit_scripts().await?
        };
        specs.sort_by_key(|spec| spec.number);

        specs.into_iter().map(|spec| self.resolve(spec)).collect()
    }

    fn resolve(&self, spec: TestCaseSpec) -> HarnessResult<TestCase> {
        Ok(TestCase {
            processes: spec.processes()?,
            input_path: self.dir.join(format!("testcase{}", spec.number)),
            expected_path: self.dir.join(format!("sorted{}", spec.number)),
            spec,
        })
    }

    async fn load_submit_scripts(&self) -> HarnessResult<Vec<TestCaseSpec>> {
        let mut specs = Vec::with_capacity(self.count as usize);
        for number in 1..=self.count {
            let path = self.dir.join(format!("submit{number}.sh"));
            let script = fs::read_to_string(&path).await.map_err(|e| {
                HarnessError::TestCase(format!("cannot read {}: {}", path.display(), e))
            })?;
            specs.push(parse_submit_script(number, &script)?);
        }
        Ok(specs)
    }
}

async fn load_manifest(path: &Path) -> HarnessResult<Vec<TestCaseSpec>> {
    let raw = fs::read(path).await?;
    serde_json::from_slice(&raw)
        .map_err(|e| HarnessError::TestCase(format!("invalid {}: {}", path.display(), e)))
}

/// Extract the launch parameters from a PBS submit script
pub fn parse_submit_script(number: u32, script: &str) -> HarnessResult<TestCaseSpec> {
    let missing =
        |what: &str| HarnessError::TestCase(format!("submit{number}.sh: no {what} line found"));

    let nodes = NODES_RE
        .captures(script)
        .ok_or_else(|| missing("`PBS -l nodes=N:ppn=P`"))?;
    let size = SIZE_RE
        .captures(script)
        .ok_or_else(|| missing("`mpiexec ./$exe SIZE`"))?;

    let number_at = |caps: &regex::Captures<'_>, idx: usize| -> HarnessResult<u64> {
        caps[idx].parse().map_err(|_| {
            HarnessError::TestCase(format!("submit{number}.sh: {} is out of range", &caps[idx]))
        })
    };

    let to_u32 = |value: u64| {
        u32::try_from(value).map_err(|_| {
            HarnessError::TestCase(format!("submit{number}.sh: {value} is out of range"))
        })
    };

    Ok(TestCaseSpec {
        number,
        nodes: to_u32(number_at(&nodes, 1)?)?,
        ppn: to_u32(number_at(&nodes, 2)?)?,
        size: number_at(&size, 1)?,
    })
}
