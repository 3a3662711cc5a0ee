//! Output filename derivation.
//!
//! Every resized file lands next to its source, named by inserting a fixed
//! suffix (`_resized` by default) between the stem and the extension:
//!
//! - `/photos/dawn.jpg` → `/photos/dawn_resized.jpg` (static: extension kept as spelled)
//! - `/photos/DAWN.JPG` → `/photos/DAWN_resized.JPG`
//! - `/clips/wave.gif` → `/clips/wave_resized.gif` (animated: always `.gif`)
//! - `/scans/page` (PNG content, no extension) → `/scans/page_resized.png`
//!
//! There is no collision avoidance: if the output already exists it is
//! overwritten, so re-running a batch replaces the previous results instead
//! of piling up numbered copies. The source itself is never a valid output:
//! the suffix must be non-empty and stay within the file name.
//!
//! The extension of a static output always names the container it is
//! encoded in. A PNG saved as `photo.jpg` is re-encoded as JPEG because the
//! name says JPEG; a source whose extension names no writable format gets
//! the detected format's extension instead.

use image::ImageFormat;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SUFFIX: &str = "_resized";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuffixError {
    #[error("output suffix must not be empty (outputs would overwrite their sources)")]
    Empty,
    #[error("output suffix {0:?} must not contain path separators")]
    PathSeparator(String),
}

/// Check that `suffix` yields a distinct output beside its source.
pub fn validate_suffix(suffix: &str) -> Result<(), SuffixError> {
    if suffix.is_empty() {
        return Err(SuffixError::Empty);
    }
    if suffix.contains(['/', '\\']) {
        return Err(SuffixError::PathSeparator(suffix.to_string()));
    }
    Ok(())
}

fn writable_format(ext: &OsStr) -> Option<ImageFormat> {
    ImageFormat::from_extension(ext).filter(|f| f.writing_enabled())
}

/// Container a static output of `source` is encoded in.
///
/// The one its extension names when that format can be written, otherwise
/// the `detected` content format.
pub fn static_output_format(source: &Path, detected: ImageFormat) -> ImageFormat {
    source
        .extension()
        .and_then(writable_format)
        .unwrap_or(detected)
}

/// What kind of artifact a source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Single image re-encoded in its source container.
    Static(ImageFormat),
    /// Multi-frame animation, always written as GIF.
    Animated,
}

impl OutputKind {
    /// Container the output is encoded in.
    pub fn format(self) -> ImageFormat {
        match self {
            OutputKind::Static(format) => format,
            OutputKind::Animated => ImageFormat::Gif,
        }
    }
}

/// Derive the output path for `source`.
///
/// For a static output the source's extension spelling is kept when it
/// names `format`; otherwise `format`'s primary extension is used.
///
/// Returns `None` if `source` has no file name (e.g. `/` or `..`), if
/// `suffix` is invalid, or if the result would be `source` itself.
pub fn output_path(source: &Path, kind: OutputKind, suffix: &str) -> Option<PathBuf> {
    validate_suffix(suffix).ok()?;
    source.file_name()?;
    let stem = source.file_stem()?;

    let ext: OsString = match kind {
        OutputKind::Animated => "gif".into(),
        OutputKind::Static(format) => match source.extension() {
            Some(ext) if ImageFormat::from_extension(ext) == Some(format) => ext.to_os_string(),
            _ => OsString::from(*format.extensions_str().first()?),
        },
    };

    let mut name = stem.to_os_string();
    name.push(suffix);
    name.push(".");
    name.push(ext);
    let output = source.with_file_name(name);
    (output != source).then_some(output)
}
