//! Fatal error types shared by the judge and benchmark tools.
//!
//! Anything represented here aborts the whole run. Failures of a single
//! trial are never errors; they are recorded as a [`Verdict`](crate::Verdict).

use std::path::PathBuf;

use thiserror::Error;

/// Setup failures that terminate a run with a non-zero exit status.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Size token could not be interpreted
    #[error("{0} is not a valid size")]
    InvalidSize(String),

    /// Bare byte count that does not hold a whole number of ints
    #[error("{0} is not a multiple of sizeof(int)")]
    NotIntMultiple(String),

    /// Compiler exited with a non-zero status
    #[error("Compilation failed")]
    CompilationFailed,

    /// Neither the compiler nor the user produced a runnable file
    #[error("The executable '{}' does not exist", .0.display())]
    ExecutableMissing(PathBuf),

    /// A reference generator or sorter failed while building a fixture
    #[error("Reference tool failed: {0}")]
    ReferenceToolFailed(String),

    /// A judge test case could not be described
    #[error("Test case error: {0}")]
    TestCase(String),

    /// The user declined an interactive confirmation
    #[error("Aborted by user")]
    Aborted,

    /// An external program could not be started at all
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Short machine-readable code, logged when a run aborts
    pub fn error_code(&self) -> &'static str {
        match self {
            HarnessError::InvalidSize(_) => "INVALID_SIZE",
            HarnessError::NotIntMultiple(_) => "NOT_INT_MULTIPLE",
            HarnessError::CompilationFailed => "COMPILATION_FAILED",
            HarnessError::ExecutableMissing(_) => "EXECUTABLE_MISSING",
            HarnessError::ReferenceToolFailed(_) => "REFERENCE_TOOL_FAILED",
            HarnessError::TestCase(_) => "TEST_CASE_ERROR",
            HarnessError::Aborted => "ABORTED",
            HarnessError::Spawn { .. } => "SPAWN_ERROR",
            HarnessError::Io(_) => "FILE_ERROR",
        }
    }
}

/// Result type alias using HarnessError
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_cli_wording() {
        assert_eq!(
            HarnessError::InvalidSize("12X".into()).to_string(),
            "12X is not a valid size"
        );
        assert_eq!(
            HarnessError::NotIntMultiple("1023".into()).to_string(),
            "1023 is not a multiple of sizeof(int)"
        );
        assert_eq!(
            HarnessError::ExecutableMissing(PathBuf::from("./a.out")).to_string(),
            "The executable './a.out' does not exist"
        );
        assert_eq!(HarnessError::CompilationFailed.error_code(), "COMPILATION_FAILED");
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            HarnessError::InvalidSize("x".into()),
            HarnessError::NotIntMultiple("1".into()),
            HarnessError::CompilationFailed,
            HarnessError::ExecutableMissing(PathBuf::from("a.out")),
            HarnessError::ReferenceToolFailed("gen".into()),
            HarnessError::TestCase("t".into()),
            HarnessError::Aborted,
            HarnessError::Spawn {
                program: "mpirun".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
            HarnessError::Io(std::io::Error::from(std::io::ErrorKind::Other)),
        ];
        let mut codes: Vec<&str> = errors.iter().map(HarnessError::error_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
