//! Benchmark table: one row per size, one column per process count

use std::fmt::Write;

use sortjudge_common::console::{heavy_rule, light_rule, red};
use sortjudge_common::{TrialRecord, Verdict};

const CELL_WIDTH: usize = 6;

/// Prefix printed (and flushed) before a trial starts
pub fn progress_prefix(label: &str, np: u32) -> String {
    format!("size={label:<5}  np={np:<3}  ")
}

/// Verdict and timing printed when a trial ends
pub fn verdict_line(record: &TrialRecord) -> String {
    format!(
        "{}  {:6.3}",
        record.verdict.paint(record.verdict.label(), 24),
        record.seconds()
    )
}

/// Table cell: elapsed seconds when accepted, the short code otherwise
pub fn cell(record: &TrialRecord) -> String {
    if record.verdict.is_accepted() {
        format!("{:6.3}", record.seconds())
    } else {
        red(&format!("{:>CELL_WIDTH$}", record.verdict.code()))
    }
}

#[derive(Debug)]
struct SizeRow {
    label: String,
    trials: Vec<TrialRecord>,
}

/// Accumulates results in arrival order
#[derive(Debug)]
pub struct BenchReport {
    nps: Vec<u32>,
    rows: Vec<SizeRow>,
}

impl BenchReport {
    pub fn new(nps: &[u32]) -> Self {
        Self {
            nps: nps.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Open a row for a size; called before its first trial
    pub fn start_size(&mut self, label: &str) {
        self.rows.push(SizeRow {
            label: label.to_string(),
            trials: Vec::with_capacity(self.nps.len()),
        });
    }

    /// Append a trial to the current row
    pub fn record(&mut self, record: &TrialRecord) {
        if let Some(row) = self.rows.last_mut() {
            row.trials.push(record.clone());
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Verdicts of every recorded trial, row by row
    pub fn verdicts(&self) -> impl Iterator<Item = Verdict> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.trials.iter().map(|trial| trial.verdict))
    }

    pub fn header(&self) -> String {
        let columns: Vec<String> = self
            .nps
            .iter()
            .map(|np| format!("{:>CELL_WIDTH$}", format!("np={np}")))
            .collect();
        format!("size  {}", columns.join("  "))
    }

    /// Render the final table between heavy rules
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", heavy_rule());
        let _ = writeln!(out, "{}", self.header());
        let _ = writeln!(out, "{}", light_rule());
        for row in &self.rows {
            let cells: Vec<String> = row.trials.iter().map(cell).collect();
            let _ = writeln!(out, "{:>4}  {}", row.label, cells.join("  "));
        }
        let _ = writeln!(out, "{}", heavy_rule());
        out
    }
}
