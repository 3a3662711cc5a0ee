//! Pure calculation functions for fit-by-cropping geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::FitSize;
use crate::ratio::Ratio;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("invalid source dimensions {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },
    #[error("image size {width}x{height} too small for ratio {ratio}")]
    TooSmall {
        width: u32,
        height: u32,
        ratio: Ratio,
    },
}

/// Calculate the largest box of the target aspect ratio that fits inside the
/// source, anchored on one full side of the source.
///
/// One dimension always matches the source exactly; the other is cropped
/// down. The box never exceeds the source, so the follow-up transform only
/// crops and never upsamples.
///
/// The comparison `source_w / source_h > ratio_w / ratio_h` and both floors
/// are evaluated by cross-multiplication in `u64`, which is exact for every
/// `u32` input.
///
/// # Arguments
/// * `source_width`, `source_height` - Original frame dimensions
/// * `ratio` - Target aspect ratio
///
/// # Returns
/// * `FitSize` - Dimensions to crop/scale the frame to
///
/// # Examples
/// ```
/// # use aspect_resize::imaging::compute_fit_size;
/// # use aspect_resize::Ratio;
/// // Square source, widescreen target: width held, height cropped
/// let fit = compute_fit_size(1000, 1000, Ratio::WIDESCREEN).unwrap();
/// assert_eq!((fit.width, fit.height), (1000, 562));
///
/// // Full HD source, square target: height held, width cropped
/// let fit = compute_fit_size(1920, 1080, Ratio::SQUARE).unwrap();
/// assert_eq!((fit.width, fit.height), (1080, 1080));
/// ```
pub fn compute_fit_size(
    source_width: u32,
    source_height: u32,
    ratio: Ratio,
) -> Result<FitSize, PlanError> {
    if source_width == 0 || source_height == 0 {
        return Err(PlanError::InvalidDimension {
            width: source_width,
            height: source_height,
        });
    }

    let (sw, sh) = (source_width as u64, source_height as u64);
    let (rw, rh) = (ratio.width() as u64, ratio.height() as u64);

    let (width, height) = if sw * rh > rw * sh {
        // Source is wider than target: keep height, crop width
        ((sh * rw / rh) as u32, source_height)
    } else {
        // Source is taller (or equal): keep width, crop height
        (source_width, (sw * rh / rw) as u32)
    };

    if width == 0 || height == 0 {
        return Err(PlanError::TooSmall {
            width: source_width,
            height: source_height,
            ratio,
        });
    }

    Ok(FitSize { width, height })
}
