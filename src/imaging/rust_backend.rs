//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Detect container | `ImageReader::with_guessed_format` (magic bytes, not extension) |
//! | Decode static (JPEG, PNG, TIFF, WebP, BMP) | `ImageReader::decode` |
//! | Decode animated (GIF) | `GifDecoder` + `AnimationDecoder::into_frames` (RGBA8, composited) |
//! | Encode static | `DynamicImage::write_to` in the source container |
//! | Encode animated | `GifEncoder` with `Repeat::Infinite` |
//!
//! Outputs are encoded into memory first and written with a single
//! `fs::write`, so encoder errors and write errors (full disk, permissions)
//! both surface as a `BackendError` instead of being lost when the writer is
//! dropped.

use super::backend::{BackendError, ImageBackend, SourceImage};
use super::params::GifSpeed;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [`supported_input_extensions`] (case-insensitive).
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    gif_speed: GifSpeed,
}

impl RustBackend {
    pub fn new() -> Self {
        Self {
            gif_speed: GifSpeed::default(),
        }
    }

    pub fn with_gif_speed(gif_speed: GifSpeed) -> Self {
        Self { gif_speed }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn encode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::Encode {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Decode every frame of a GIF in display order.
fn decode_gif(path: &Path) -> Result<SourceImage, BackendError> {
    let reader = BufReader::new(File::open(path)?);
    let decoder = GifDecoder::new(reader).map_err(|e| decode_error(path, e))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| decode_error(path, e))?;
    if frames.is_empty() {
        return Err(decode_error(path, "animation has no frames"));
    }
    Ok(SourceImage::Animated { frames })
}

impl ImageBackend for RustBackend {
    fn open(&self, path: &Path) -> Result<SourceImage, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| BackendError::UnsupportedFormat(path.display().to_string()))?;

        if format == ImageFormat::Gif {
            return decode_gif(path);
        }

        let image = reader.decode().map_err(|e| decode_error(path, e))?;
        Ok(SourceImage::Static { image, format })
    }

    fn save_static(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        output: &Path,
    ) -> Result<(), BackendError> {
        if !format.writing_enabled() {
            return Err(BackendError::UnsupportedFormat(format!(
                "{format:?} (no encoder for {})",
                output.display()
            )));
        }

        let mut buf = Cursor::new(Vec::new());
        let result = match format {
            // JPEG has no alpha channel
            ImageFormat::Jpeg if image.color().has_alpha() => {
                DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buf, format)
            }
            _ => image.write_to(&mut buf, format),
        };
        result.map_err(|e| encode_error(output, e))?;

        std::fs::write(output, buf.into_inner())?;
        Ok(())
    }

    fn save_animated(&self, frames: Vec<Frame>, output: &Path) -> Result<(), BackendError> {
        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut buf, self.gif_speed.value());
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| encode_error(output, e))?;
            encoder
                .encode_frames(frames)
                .map_err(|e| encode_error(output, e))?;
            // Encoder writes the GIF trailer when dropped here
        }

        std::fs::write(output, buf)?;
        Ok(())
    }
}
