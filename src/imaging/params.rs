//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. They sit between the
//! planner (which decides the geometry) and the [`backend`](super::backend)
//! (which decodes and encodes files).
//!
//! ## Types
//!
//! - [`FitSize`] — Target box computed by the planner; always ≤ the source.
//! - [`GifSpeed`] — GIF quantizer speed (1–30, default 10). Clamped on construction.

/// Output dimensions for a fit-by-cropping transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitSize {
    pub width: u32,
    pub height: u32,
}

/// Speed/quality trade-off of the GIF colour quantizer.
///
/// `1` samples every pixel (best palette, slowest), `30` samples sparsely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifSpeed(u8);

impl GifSpeed {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 30;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN as u32, Self::MAX as u32) as u8)
    }

    pub fn value(self) -> i32 {
        self.0 as i32
    }
}

impl Default for GifSpeed {
    fn default() -> Self {
        Self(10)
    }
}
