//! High-level image operations.
//!
//! These combine the planner ([`compute_fit_size`]) with the pixel transform.
//! The transform is a center-crop-then-scale "fill" with Lanczos3: the output
//! exactly covers the planned box, never letterboxes, and never distorts.
//! Since the planned box is never larger than the source, in practice this
//! is a center crop.

use super::backend::SourceImage;
use super::calculations::{PlanError, compute_fit_size};
use super::params::FitSize;
use crate::ratio::Ratio;
use image::imageops::FilterType;
use image::{DynamicImage, Frame, ImageFormat};

/// A transformed source, ready for encoding.
pub enum FittedImage {
    Static {
        image: DynamicImage,
        format: ImageFormat,
    },
    Animated {
        frames: Vec<Frame>,
    },
}

/// Crop/scale `image` to exactly `size`.
fn fill(image: &DynamicImage, size: FitSize) -> DynamicImage {
    if (image.width(), image.height()) == (size.width, size.height) {
        return image.clone();
    }
    image.resize_to_fill(size.width, size.height, FilterType::Lanczos3)
}

/// Fit a single raster to `ratio`.
pub fn fit_image(image: &DynamicImage, ratio: Ratio) -> Result<DynamicImage, PlanError> {
    let size = compute_fit_size(image.width(), image.height(), ratio)?;
    Ok(fill(image, size))
}

/// Fit one animation frame to `ratio`, keeping its display delay.
///
/// The frame is planned on its own dimensions. The result is placed at the
/// canvas origin.
pub fn fit_frame(frame: Frame, ratio: Ratio) -> Result<Frame, PlanError> {
    let delay = frame.delay();
    let buffer = frame.into_buffer();
    let size = compute_fit_size(buffer.width(), buffer.height(), ratio)?;
    let fitted = fill(&DynamicImage::ImageRgba8(buffer), size).into_rgba8();
    Ok(Frame::from_parts(fitted, 0, 0, delay))
}

/// Fit every frame of a source, preserving frame order and delays.
pub fn fit_source(source: SourceImage, ratio: Ratio) -> Result<FittedImage, PlanError> {
    match source {
        SourceImage::Static { image, format } => Ok(FittedImage::Static {
            image: fit_image(&image, ratio)?,
            format,
        }),
        SourceImage::Animated { frames } => {
            let frames = frames
                .into_iter()
                .map(|frame| fit_frame(frame, ratio))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FittedImage::Animated { frames })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::frame_delay_ms;
    use image::{Delay, Rgba, RgbaImage};

    /// Image whose left half is red and right half is blue.
    fn split_image(width: u32, height: u32) -> DynamicImage {
        let img = RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn fit_image_has_planned_dimensions() {
        let img = DynamicImage::new_rgb8(1920, 1080);
        let out = fit_image(&img, Ratio::SQUARE).unwrap();
        assert_eq!((out.width(), out.height()), (1080, 1080));
    }

    #[test]
    fn fit_image_crops_from_center() {
        // 400x100 red|blue, cropped to 1:1 → the 100x100 center straddles both halves
        let img = split_image(400, 100);
        let out = fit_image(&img, Ratio::SQUARE).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.get_pixel(5, 50)[0], 255);
        assert_eq!(out.get_pixel(94, 50)[2], 255);
    }

    #[test]
    fn fit_image_keeps_matching_aspect_unchanged() {
        let img = split_image(160, 90);
        let out = fit_image(&img, Ratio::WIDESCREEN).unwrap();
        assert_eq!(out.to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn fit_image_propagates_too_small() {
        let img = DynamicImage::new_rgb8(1, 100);
        assert!(matches!(
            fit_image(&img, Ratio::WIDESCREEN),
            Err(PlanError::TooSmall { .. })
        ));
    }

    #[test]
    fn fit_frame_keeps_delay() {
        let frame = Frame::from_parts(
            RgbaImage::new(64, 64),
            0,
            0,
            Delay::from_numer_denom_ms(150, 1),
        );
        let out = fit_frame(frame, Ratio::WIDESCREEN).unwrap();
        assert_eq!(out.buffer().dimensions(), (64, 36));
        assert_eq!(frame_delay_ms(&out), 150);
    }

    #[test]
    fn fit_source_preserves_frame_order() {
        let frames = [10u8, 20, 30]
            .iter()
            .map(|&shade| {
                Frame::from_parts(
                    RgbaImage::from_pixel(40, 40, Rgba([shade, shade, shade, 255])),
                    0,
                    0,
                    Delay::from_numer_denom_ms(shade as u32, 1),
                )
            })
            .collect();

        let FittedImage::Animated { frames } =
            fit_source(SourceImage::Animated { frames }, Ratio::STANDARD).unwrap()
        else {
            panic!("expected animated output");
        };
        let shades: Vec<u8> = frames.iter().map(|f| f.buffer().get_pixel(0, 0)[0]).collect();
        assert_eq!(shades, vec![10, 20, 30]);
        assert!(frames.iter().all(|f| f.buffer().dimensions() == (40, 30)));
    }

    #[test]
    fn fit_source_keeps_static_format() {
        let source = SourceImage::Static {
            image: DynamicImage::new_rgb8(300, 300),
            format: ImageFormat::Jpeg,
        };
        let FittedImage::Static { image, format } = fit_source(source, Ratio::STANDARD).unwrap()
        else {
            panic!("expected static output");
        };
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!((image.width(), image.height()), (300, 225));
    }
}
