//! # aspect-resize
//!
//! Crops a batch of images to a fixed aspect ratio without upscaling and
//! without letterboxing. Each output keeps as much of its source as the
//! target shape allows and is written next to the source as
//! `<name>_resized.<ext>`. Animated GIFs keep every frame, every frame delay,
//! and loop forever.
//!
//! # Architecture
//!
//! ```text
//! RatioSelection ──resolve──▶ Ratio ─┐
//!                                    ├─▶ ResizeExecutor::start ──▶ worker thread
//! paths ──validate_batch─────────────┘        │                     open → fit → write
//!                                             ▼
//!                              RunHandle::drive(observer)  ◀── ResizeEvent channel
//! ```
//!
//! The planner is pure integer math, the imaging backend is a trait so the
//! executor can be tested without real files, and progress reaches callers
//! only through events on a channel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`ratio`] | Target aspect ratio: presets, custom `W:H` parsing and validation |
//! | [`imaging`] | Fit-size planning, the `ImageBackend` trait, pure-Rust decode/crop/encode |
//! | [`naming`] | `<stem>_resized.<ext>` output path derivation |
//! | [`executor`] | Background batch runner, per-file error isolation, progress events |
//! | [`scan`] | Expanding command-line paths and directories into a batch |
//! | [`config`] | `aspect-resize.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI output formatting for runs and reports |
//!
//! # Design Decisions
//!
//! ## Crop, Never Pad or Upscale
//!
//! The fitted size is the largest `W:H` rectangle that fits inside the source.
//! One source dimension is always kept, the other shrinks. The image is then
//! scaled to cover that rectangle and centre-cropped, so the output never
//! holds a pixel that was not in the source.
//!
//! ## Failures Stay Per File
//!
//! A batch is a list of independent jobs. A corrupt file, a source too small
//! for the ratio, or a failed write is recorded against that file in the
//! [`executor::BatchReport`] and the batch moves on. Only an invalid ratio or
//! an empty batch stops a run before it starts.
//!
//! ## Overwrite Instead of Renumber
//!
//! Output names are a pure function of the source path. Running the same
//! batch twice replaces the earlier outputs rather than creating
//! `_resized (1)` copies.

pub mod config;
pub mod executor;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod ratio;
pub mod scan;

pub use executor::{BatchReport, ProgressObserver, ResizeExecutor, ResizeOptions, RunHandle};
pub use imaging::RustBackend;
pub use ratio::{Ratio, RatioPreset, RatioSelection};
