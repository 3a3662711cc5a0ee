//! Image decode/encode backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three file operations the resize
//! engine needs: open a source, write a static output, and write an animated
//! output. All pixel math (planning, crop/scale) happens outside the backend
//! in [`operations`](super::operations), so a mock backend exercises the
//! whole executor without touching real files.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use image::{DynamicImage, Frame, ImageFormat};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: String, message: String },
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

/// A decoded source, classified once at open time.
///
/// Containers that can animate (GIF) always open as [`SourceImage::Animated`],
/// even with a single frame, so their output stays a GIF.
#[derive(Clone)]
pub enum SourceImage {
    /// One raster plus the container it came from (re-used for the output).
    Static {
        image: DynamicImage,
        format: ImageFormat,
    },
    /// Every frame in display order, each carrying its own delay.
    Animated { frames: Vec<Frame> },
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceImage::Static { image, format } => f
                .debug_struct("Static")
                .field("width", &image.width())
                .field("height", &image.height())
                .field("format", format)
                .finish(),
            SourceImage::Animated { frames } => f
                .debug_struct("Animated")
                .field("frames", &frames.len())
                .finish(),
        }
    }
}

impl SourceImage {
    pub fn frame_count(&self) -> usize {
        match self {
            SourceImage::Static { .. } => 1,
            SourceImage::Animated { frames } => frames.len(),
        }
    }
}

/// Trait for image decode/encode backends.
///
/// `Send + Sync` because the executor moves the backend onto its worker
/// thread behind an `Arc`.
pub trait ImageBackend: Send + Sync {
    /// Decode a source file and classify it as static or animated.
    fn open(&self, path: &Path) -> Result<SourceImage, BackendError>;

    /// Encode a single image in the given container format, overwriting `output`.
    fn save_static(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        output: &Path,
    ) -> Result<(), BackendError>;

    /// Encode frames as an infinitely looping GIF, overwriting `output`.
    fn save_animated(&self, frames: Vec<Frame>, output: &Path) -> Result<(), BackendError>;
}

/// Display delay of a frame in whole milliseconds.
pub fn frame_delay_ms(frame: &Frame) -> u32 {
    let (numer, denom) = frame.delay().numer_denom_ms();
    if denom == 0 { 0 } else { numer / denom }
}
