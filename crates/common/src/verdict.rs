//! Verdict types and classification logic

use std::fmt;
use std::time::Duration;

use crate::console::{green, red};

/// Classified outcome of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Output matches the reference byte for byte
    Accepted,
    /// Output differs from the reference
    WrongAnswer,
    /// Wall-clock timeout expired
    TimedOut,
    /// Launcher exited non-zero or was killed by a signal
    RuntimeError {
        /// Exit code, or the negated signal number
        exit_code: i32,
    },
    /// Program finished cleanly but left no output file
    NoOutput,
}

impl Verdict {
    /// Get short code for verdict
    pub fn code(&self) -> &'static str {
        match self {
            Verdict::Accepted => "AC",
            Verdict::WrongAnswer => "WA",
            Verdict::TimedOut => "TLE",
            Verdict::RuntimeError { .. } => "RE",
            Verdict::NoOutput => "NO",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Accepted => "Accepted",
            Verdict::WrongAnswer => "Wrong Answer",
            Verdict::TimedOut => "Timed Out",
            Verdict::RuntimeError { .. } => "Runtime Error",
            Verdict::NoOutput => "No Output",
        }
    }

    /// Label including the exit code for runtime errors
    pub fn detailed_label(&self) -> String {
        match self {
            Verdict::RuntimeError { exit_code } => format!("Runtime Error ({exit_code})"),
            other => other.label().to_string(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// Pad `text` to `width` and color it by outcome.
    ///
    /// Padding happens before coloring so escape codes do not eat into the
    /// column width.
    pub fn paint(&self, text: &str, width: usize) -> String {
        let padded = format!("{text:<width$}");
        if self.is_accepted() {
            green(&padded)
        } else {
            red(&padded)
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// How the launched process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Exited with status zero
    Success,
    /// Exited non-zero, or died from a signal (negated signal number)
    Failure(i32),
    /// Killed by the harness after the timeout
    TimedOut,
}

/// Result of comparing the produced output with the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCheck {
    /// Output or reference file is absent
    Missing,
    /// Both exist but differ
    Differs,
    /// Both exist and are identical
    Matches,
}

/// Classify a trial.
///
/// Priority is fixed: timeout, then runtime error, then missing output,
/// then mismatch. The output check is only consulted after a clean exit,
/// so callers may pass `None` when the process did not succeed.
pub fn classify(exit: ExitKind, output: Option<OutputCheck>) -> Verdict {
    match exit {
        ExitKind::TimedOut => Verdict::TimedOut,
        ExitKind::Failure(exit_code) => Verdict::RuntimeError { exit_code },
        ExitKind::Success => match output {
            None | Some(OutputCheck::Missing) => Verdict::NoOutput,
            Some(OutputCheck::Differs) => Verdict::WrongAnswer,
            Some(OutputCheck::Matches) => Verdict::Accepted,
        },
    }
}

/// One recorded trial
#[derive(Debug, Clone)]
pub struct TrialRecord {
    /// Classified outcome
    pub verdict: Verdict,
    /// Wall-clock time from spawn until the output has been checked
    pub elapsed: Duration,
}

impl TrialRecord {
    /// Elapsed time in seconds, as printed in reports
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKS: [Option<OutputCheck>; 4] = [
        None,
        Some(OutputCheck::Missing),
        Some(OutputCheck::Differs),
        Some(OutputCheck::Matches),
    ];

    #[test]
    fn test_timeout_wins_over_everything() {
        for check in CHECKS {
            assert_eq!(classify(ExitKind::TimedOut, check), Verdict::TimedOut);
        }
    }

    #[test]
    fn test_runtime_error_ignores_output() {
        for check in CHECKS {
            assert_eq!(
                classify(ExitKind::Failure(3), check),
                Verdict::RuntimeError { exit_code: 3 }
            );
        }
    }

    #[test]
    fn test_clean_exit_uses_output_check() {
        assert_eq!(classify(ExitKind::Success, None), Verdict::NoOutput);
        assert_eq!(
            classify(ExitKind::Success, Some(OutputCheck::Missing)),
            Verdict::NoOutput
        );
        assert_eq!(
            classify(ExitKind::Success, Some(OutputCheck::Differs)),
            Verdict::WrongAnswer
        );
        assert_eq!(
            classify(ExitKind::Success, Some(OutputCheck::Matches)),
            Verdict::Accepted
        );
    }

    #[test]
    fn test_labels_and_codes() {
        assert_eq!(Verdict::TimedOut.code(), "TLE");
        assert_eq!(Verdict::NoOutput.label(), "No Output");
        assert_eq!(
            Verdict::RuntimeError { exit_code: -9 }.detailed_label(),
            "Runtime Error (-9)"
        );
        assert_eq!(Verdict::Accepted.detailed_label(), "Accepted");
    }

    #[test]
    fn test_paint_pads_before_coloring() {
        assert_eq!(Verdict::WrongAnswer.paint("WA", 4), "\x1b[0;31mWA  \x1b[0m");
        assert_eq!(Verdict::Accepted.paint("ok", 2), "\x1b[0;32mok\x1b[0m");
    }
}
