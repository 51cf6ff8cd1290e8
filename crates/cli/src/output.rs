//! Terminal output for the CLI outside the check report itself

use std::path::Path;

use colored::Colorize;
use siteqa_common::{RunStatus, RunSummary};

/// Whether report lines should be colored. `NO_COLOR` wins over everything.
pub fn use_color(no_color_flag: bool) -> bool {
    if no_color_flag || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
        return false;
    }
    true
}

/// Print the run heading
pub fn print_banner(pipeline: &str, target: &str) {
    println!("{} {}", pipeline.bold(), target.dimmed());
}

/// Print a fatal error
pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Print an informational note
pub fn print_info(message: &str) {
    eprintln!("ℹ️  {}", message);
}

/// Persist the summary for CI consumption. A write failure is reported but
/// does not change the run's outcome.
pub fn write_summary(summary: &RunSummary, path: &Path) {
    match summary.write_json(path) {
        Ok(()) => print_info(&format!("Summary written to {}", path.display())),
        Err(e) => print_error(&format!("Cannot write summary to {}: {}", path.display(), e)),
    }
}

/// Process exit code for a finished run
pub fn exit_code(status: RunStatus) -> u8 {
    status.exit_code() as u8
}

/// Exit code for a run that could not complete
pub const FATAL_EXIT: u8 = 2;
