//! Batch collection from command-line paths.
//!
//! Explicit files are taken as given, in the order given, whatever their
//! extension; the backend decides from content whether it can read them.
//! Directories are expanded into the image files they hold:
//!
//! - Only files with a readable image extension (see
//!   [`has_supported_extension`]) are picked up.
//! - Hidden entries (`.name`) are skipped.
//! - Files that already look like outputs (`dawn_resized.jpg` for suffix
//!   `_resized`) are skipped, so re-running on a directory does not resize
//!   its own results.
//! - Without `recursive` only the directory's direct children are listed.
//! - Each directory's files are sorted by path.

use crate::imaging::rust_backend::has_supported_extension;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Expand `paths` into an ordered batch.
pub fn collect_batch(paths: &[PathBuf], recursive: bool, output_suffix: &str) -> Vec<PathBuf> {
    let mut batch = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = collect_dir(path, recursive, output_suffix);
            debug!(dir = %path.display(), count = found.len(), "expanded directory");
            batch.extend(found);
        } else {
            batch.push(path.clone());
        }
    }
    batch
}

fn collect_dir(dir: &Path, recursive: bool, output_suffix: &str) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| has_supported_extension(p) && !is_previous_output(p, output_suffix))
        .collect();
    images.sort();
    images
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn is_previous_output(path: &Path, output_suffix: &str) -> bool {
    path.file_stem()
        .map(|s| s.to_string_lossy().ends_with(output_suffix))
        .unwrap_or(false)
}
