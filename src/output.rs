//! CLI output formatting for resize runs.
//!
//! # Display Contract
//!
//! Each processed file gets one line, led by its 1-based position in the
//! batch and the running percentage, followed by the source file name and
//! either the output name or the failure reason:
//!
//! ```text
//! Resizing 4 images to 16:9
//! [001/004  25%] dawn.jpg → dawn_resized.jpg
//! [002/004  50%] broken.png ✗ Failed to decode /photos/broken.png: ...
//! [003/004  75%] wave.gif → wave_resized.gif
//! [004/004 100%] night.png → night_resized.png
//! Done: 3 resized, 1 failed
//! ```
//!
//! # Architecture
//!
//! Every `format_*` function is pure and returns lines (or a JSON value) for
//! testability. The terminal observer in `main.rs` prints them.

use crate::executor::{BatchReport, progress_percent};
use crate::ratio::Ratio;
use serde_json::json;
use std::path::Path;

/// File name of `path` for display, falling back to the whole path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a 1-based batch position as `[NNN/TTT PPP%]`.
fn position(completed: usize, total: usize) -> String {
    format!(
        "[{:0>3}/{:0>3} {:>3}%]",
        completed,
        total,
        progress_percent(completed, total)
    )
}

/// Header printed before the first file.
pub fn format_started(total: usize, ratio: Ratio) -> String {
    let noun = if total == 1 { "image" } else { "images" };
    format!("Resizing {} {} to {}", total, noun, ratio)
}

/// Line for a file that was written. `completed` counts this file.
pub fn format_file_done(completed: usize, total: usize, source: &Path, output: &Path) -> String {
    format!(
        "{} {} \u{2192} {}",
        position(completed, total),
        display_name(source),
        display_name(output)
    )
}

/// Line for a file that failed. `completed` counts this file.
pub fn format_file_failed(completed: usize, total: usize, source: &Path, message: &str) -> String {
    format!(
        "{} {} \u{2717} {}",
        position(completed, total),
        display_name(source),
        message
    )
}

/// Closing summary of a run.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let succeeded = report.succeeded();
    let failed = report.files.len() - succeeded;
    let mut lines = vec![format!("Done: {} resized, {} failed", succeeded, failed)];
    if report.cancelled {
        lines.push(format!(
            "Cancelled: {} of {} images not processed",
            report.total - report.files.len(),
            report.total
        ));
    }
    lines
}

/// Machine-readable form of a batch report.
pub fn report_json(report: &BatchReport) -> serde_json::Value {
    let files: Vec<serde_json::Value> = report
        .files
        .iter()
        .map(|f| match &f.result {
            Ok(output) => json!({
                "source": f.source.display().to_string(),
                "status": "resized",
                "output": output.display().to_string(),
            }),
            Err(e) => json!({
                "source": f.source.display().to_string(),
                "status": "failed",
                "error": e.to_string(),
            }),
        })
        .collect();

    json!({
        "total": report.total,
        "resized": report.succeeded(),
        "failed": report.files.len() - report.succeeded(),
        "cancelled": report.cancelled,
        "files": files,
    })
}
