//! Judge table: one line per test case

use std::fmt::Write;

use sortjudge_common::TrialRecord;
use sortjudge_common::console::heavy_rule;

/// Result line for one test case
pub fn result_line(number: u32, record: &TrialRecord) -> String {
    format!(
        "testcase{:<2}  {}  {:6.3}",
        number,
        record.verdict.paint(&record.verdict.detailed_label(), 30),
        record.seconds()
    )
}

/// Accumulates judged test cases in arrival order
#[derive(Debug, Default)]
pub struct JudgeReport {
    entries: Vec<(u32, TrialRecord)>,
}

impl JudgeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, number: u32, record: TrialRecord) {
        self.entries.push((number, record));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of accepted test cases
    pub fn accepted(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, record)| record.verdict.is_accepted())
            .count()
    }

    /// Render the summary under a heavy rule
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", heavy_rule());
        for (number, record) in &self.entries {
            let _ = writeln!(out, "{}", result_line(*number, record));
        }
        out
    }
}
