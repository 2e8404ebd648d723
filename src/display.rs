//! Colored CLI display utilities for launcher output.
//!
//! Status lines go to stderr so they never mix into the child's stdout.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitStatus;

use chrono::Utc;
use owo_colors::OwoColorize;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Render an optional pid for display.
#[must_use]
pub fn format_pid(pid: Option<u32>) -> String {
    pid.map_or_else(|| "?".to_string(), |p| p.to_string())
}

/// Render an optional exit status for display.
#[must_use]
pub fn format_status(status: Option<ExitStatus>) -> String {
    match status {
        Some(status) => match status.code() {
            Some(code) => format!("code={code}"),
            None => "signal".to_string(),
        },
        None => "unknown".to_string(),
    }
}

/// Print the watch banner.
pub fn print_watching(dir: &Path, file_name: &str) {
    eprintln!(
        "{} {} {} in {}",
        timestamp().dimmed(),
        "[WATCH]".blue().bold(),
        file_name.cyan(),
        dir.display().dimmed()
    );
    let _ = io::stderr().flush();
}

/// Print a newly started child.
pub fn print_child_started(pid: Option<u32>, command_line: &str) {
    eprintln!(
        "{} {} pid={} {}",
        timestamp().dimmed(),
        "[START]".green().bold(),
        format_pid(pid),
        command_line.dimmed()
    );
    let _ = io::stderr().flush();
}

/// Print a child that exited on its own.
pub fn print_child_exited(pid: Option<u32>, status: Option<ExitStatus>) {
    eprintln!(
        "{} {} pid={} {}",
        timestamp().dimmed(),
        "[EXIT]".blue().bold(),
        format_pid(pid),
        format_status(status).dimmed()
    );
    let _ = io::stderr().flush();
}

/// Print a detected change on the watched file.
pub fn print_change_detected(file_name: &str) {
    eprintln!(
        "{} {} {}",
        timestamp().dimmed(),
        "[CHANGE]".yellow().bold(),
        file_name
    );
    let _ = io::stderr().flush();
}

/// Print a completed restart.
pub fn print_restart(old_pid: Option<u32>, new_pid: Option<u32>) {
    eprintln!(
        "{} {} pid={} -> pid={}",
        timestamp().dimmed(),
        "[RESTART]".magenta().bold(),
        format_pid(old_pid),
        format_pid(new_pid)
    );
    let _ = io::stderr().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message.red());
    let _ = io::stderr().flush();
}
