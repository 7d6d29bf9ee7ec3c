//! Progress display for a run.
//!
//! Log lines are routed through `log_writer`, which suspends the active
//! progress bar while a line is printed so the two never interleave.

use std::io::{self, Write};
use std::sync::{OnceLock, RwLock};

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use govlinks::RunSummary;

use super::icons::{dim_arrow, success, warn};

/// Global reference to the active progress bar for coordinating output.
static ACTIVE_BAR: OnceLock<RwLock<Option<ProgressBar>>> = OnceLock::new();

fn active_bar() -> &'static RwLock<Option<ProgressBar>> {
    ACTIVE_BAR.get_or_init(|| RwLock::new(None))
}

/// Set the global active progress bar.
pub fn set_active_bar(bar: Option<ProgressBar>) {
    if let Ok(mut guard) = active_bar().write() {
        *guard = bar;
    }
}

/// Writer handed to the tracing subscriber.
pub fn log_writer() -> ProgressAwareWriter {
    ProgressAwareWriter
}

/// Stderr writer that hides the active progress bar while writing.
pub struct ProgressAwareWriter;

impl Write for ProgressAwareWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(guard) = active_bar().read() {
            if let Some(ref bar) = *guard {
                bar.suspend(|| io::stderr().write_all(buf))?;
                return Ok(buf.len());
            }
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Progress bar over catalog titles. Hidden when stderr is not a terminal.
pub fn title_bar() -> ProgressBar {
    if !Term::stderr().is_term() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar.set_message("Searching titles");
    bar
}

/// Print the end-of-run summary.
pub fn print_summary(summary: &RunSummary, output: &str, verified_mode: bool) {
    eprintln!(
        "{} Wrote {} records to {}",
        success(),
        style(summary.records_written).bold(),
        output
    );
    eprintln!(
        "  {} Titles: {} loaded, {} searched",
        dim_arrow(),
        summary.titles_loaded,
        summary.titles_searched
    );
    eprintln!("  {} Candidate links: {}", dim_arrow(), summary.candidates);
    if verified_mode {
        eprintln!(
            "  {} Pages: {} verified, {} rejected, {} inconclusive",
            dim_arrow(),
            summary.verified,
            summary.rejected,
            summary.inconclusive
        );
    }
    if summary.search_errors > 0 || summary.item_failures > 0 {
        eprintln!(
            "  {} {} search errors, {} failed titles",
            warn(),
            summary.search_errors,
            summary.item_failures
        );
    }
    eprintln!(
        "  {} Started {}, took {:.1}s",
        dim_arrow(),
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.elapsed.as_secs_f64()
    );
}
