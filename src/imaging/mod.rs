//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Plan** | [`compute_fit_size`] (integer cross-multiplication) |
//! | **Decode** | `image::ImageReader`, `GifDecoder` for animations |
//! | **Crop/scale** | `DynamicImage::resize_to_fill` with Lanczos3 |
//! | **Encode** | `DynamicImage::write_to` (source container), `GifEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure fit-size math (unit testable)
//! - **Parameters**: Small value types shared by the other parts
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Pixel transforms combining calculations + `image` ops

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, SourceImage, frame_delay_ms};
pub use calculations::{PlanError, compute_fit_size};
pub use operations::{FittedImage, fit_source};
pub use params::{FitSize, GifSpeed};
pub use rust_backend::RustBackend;
