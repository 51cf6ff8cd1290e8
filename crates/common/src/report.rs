//! Check reporter
//!
//! Accumulates pass/fail/warning counts and prints one line per outcome, in
//! the exact order outcomes are recorded. The console transcript doubles as
//! the audit trail of what a run exercised, so nothing is buffered or
//! reordered.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    Warn,
}

/// Final classification of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    SuccessWithWarnings,
    Failure,
}

impl RunStatus {
    /// Classify a run from its counters. Order of recording is irrelevant.
    pub fn from_counts(failed: u32, warned: u32) -> Self {
        if failed > 0 {
            RunStatus::Failure
        } else if warned > 0 {
            RunStatus::SuccessWithWarnings
        } else {
            RunStatus::Success
        }
    }

    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Failure => 1,
            RunStatus::Success | RunStatus::SuccessWithWarnings => 0,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "all checks passed"),
            RunStatus::SuccessWithWarnings => write!(f, "passed with warnings"),
            RunStatus::Failure => write!(f, "failed"),
        }
    }
}

/// Serializable end-of-run summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub passed: u32,
    pub failed: u32,
    pub warned: u32,
    pub status: RunStatus,
    pub duration_ms: u64,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Write the summary as pretty JSON
    pub fn write_json(&self, path: &std::path::Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Process-wide check reporter
pub struct Reporter {
    passed: u32,
    failed: u32,
    warned: u32,
    out: Box<dyn Write + Send>,
    color: bool,
    started: Instant,
}

impl Reporter {
    /// Reporter printing to stdout
    pub fn stdout(color: bool) -> Self {
        Self::with_writer(io::stdout(), color)
    }

    /// Reporter printing to an arbitrary sink
    pub fn with_writer<W: Write + Send + 'static>(out: W, color: bool) -> Self {
        Self {
            passed: 0,
            failed: 0,
            warned: 0,
            out: Box::new(out),
            color,
            started: Instant::now(),
        }
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn warned(&self) -> u32 {
        self.warned
    }

    /// Print a group heading. Counters are untouched.
    pub fn section(&mut self, title: &str) {
        let line = if self.color {
            format!("\n{} {}", "▸".cyan(), title.bold())
        } else {
            format!("\n▸ {}", title)
        };
        self.emit(&line);
    }

    /// Record a passing check
    pub fn pass(&mut self, label: impl fmt::Display) {
        self.record(Outcome::Pass, &label.to_string(), None);
    }

    /// Record a failing check with optional detail
    pub fn fail(&mut self, label: impl fmt::Display, detail: Option<&str>) {
        self.record(Outcome::Fail, &label.to_string(), detail);
    }

    /// Record a soft warning. Never affects pass/fail classification.
    pub fn warn(&mut self, label: impl fmt::Display, detail: Option<&str>) {
        self.record(Outcome::Warn, &label.to_string(), detail);
    }

    /// Record an outcome. Infallible: sink write errors are dropped.
    pub fn record(&mut self, outcome: Outcome, label: &str, detail: Option<&str>) {
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => self.failed += 1,
            Outcome::Warn => self.warned += 1,
        }
        let line = self.format_line(outcome, label, detail);
        self.emit(&line);
    }

    /// Current classification
    pub fn status(&self) -> RunStatus {
        RunStatus::from_counts(self.failed, self.warned)
    }

    /// Snapshot of the counters without printing
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            passed: self.passed,
            failed: self.failed,
            warned: self.warned,
            status: self.status(),
            duration_ms: self.started.elapsed().as_millis() as u64,
            finished_at: Utc::now(),
        }
    }

    /// Print the closing summary block and return the final summary
    pub fn summarize(&mut self) -> RunSummary {
        let summary = self.summary();
        let counts = format!(
            "{} passed, {} failed, {} warnings ({} ms)",
            summary.passed, summary.failed, summary.warned, summary.duration_ms
        );
        let status = summary.status.to_string();
        let lines = if self.color {
            let status = match summary.status {
                RunStatus::Success => status.green().bold(),
                RunStatus::SuccessWithWarnings => status.yellow().bold(),
                RunStatus::Failure => status.red().bold(),
            };
            format!("\n{}\nResult: {}", counts, status)
        } else {
            format!("\n{}\nResult: {}", counts, status)
        };
        self.emit(&lines);
        summary
    }

    fn format_line(&self, outcome: Outcome, label: &str, detail: Option<&str>) -> String {
        let mark = match outcome {
            Outcome::Pass => "✓",
            Outcome::Fail => "✗",
            Outcome::Warn => "⚠",
        };

        if !self.color {
            return match detail {
                Some(d) => format!("  {} {}: {}", mark, label, d),
                None => format!("  {} {}", mark, label),
            };
        }

        let mark = match outcome {
            Outcome::Pass => mark.green(),
            Outcome::Fail => mark.red().bold(),
            Outcome::Warn => mark.yellow().bold(),
        };
        match detail {
            Some(d) => format!("  {} {}: {}", mark, label, d.dimmed()),
            None => format!("  {} {}", mark, label),
        }
    }

    fn emit(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }
}

/// In-memory sink that can be shared with a [`Reporter`] and read back
#[derive(Debug, Clone, Default)]
pub struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Lines of the transcript that record an outcome
    pub fn outcome_lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| l.starts_with("  ✓") || l.starts_with("  ✗") || l.starts_with("  ⚠"))
            .map(str::to_string)
            .collect()
    }
}

impl Write for Capture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Plain reporter writing into a fresh capture buffer
pub fn captured() -> (Reporter, Capture) {
    let capture = Capture::new();
    (Reporter::with_writer(capture.clone(), false), capture)
}
