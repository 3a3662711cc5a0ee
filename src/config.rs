//! Resizer configuration module.
//!
//! Handles loading, validating, and merging an `aspect-resize.toml` file on
//! top of the stock defaults. Only run defaults live here; the batch itself
//! always comes from the caller.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! ratio = "16:9"        # Used when no ratio is given on the command line
//! suffix = "_resized"   # Inserted between file stem and extension
//!
//! [gif]
//! encoder_speed = 10    # 1 (best palette, slowest) .. 30 (fastest)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [resize]
//! ratio = "1:1"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::GifSpeed;
use crate::naming::{self, DEFAULT_SUFFIX};
use crate::ratio::Ratio;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "aspect-resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resizer configuration loaded from `aspect-resize.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizerConfig {
    /// Ratio and output naming.
    pub resize: ResizeConfig,
    /// Animated GIF encoding.
    pub gif: GifConfig,
}

impl ResizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        naming::validate_suffix(&self.resize.suffix)
            .map_err(|e| ConfigError::Validation(format!("resize.suffix: {e}")))?;
        let speed = self.gif.encoder_speed;
        if !(GifSpeed::MIN as u32..=GifSpeed::MAX as u32).contains(&speed) {
            return Err(ConfigError::Validation(format!(
                "gif.encoder_speed must be {}-{}, got {speed}",
                GifSpeed::MIN,
                GifSpeed::MAX
            )));
        }
        Ok(())
    }

    pub fn gif_speed(&self) -> GifSpeed {
        GifSpeed::new(self.gif.encoder_speed)
    }
}

/// Ratio and output naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Target aspect ratio as `"W:H"`.
    pub ratio: Ratio,
    /// Text inserted between the file stem and its extension.
    pub suffix: String,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            ratio: Ratio::default(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// Animated GIF encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifConfig {
    /// Colour quantizer speed, 1 (best) to 30 (fastest).
    pub encoder_speed: u32,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            encoder_speed: GifSpeed::default().value() as u32,
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ResizerConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `path`, merged over stock defaults and validated.
///
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<ResizerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: ResizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# aspect-resize configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Resizing
# ---------------------------------------------------------------------------
[resize]
# Target aspect ratio as "WIDTH:HEIGHT", used when --ratio / --width and
# --height are not given. Presets: "1:1", "4:3", "16:9"; any positive W:H works.
ratio = "16:9"

# Inserted between the file stem and its extension:
#   dawn.jpg -> dawn_resized.jpg, wave.gif -> wave_resized.gif
# Existing files with that name are overwritten.
suffix = "_resized"

# ---------------------------------------------------------------------------
# Animated GIF output
# ---------------------------------------------------------------------------
[gif]
# Colour quantizer speed: 1 samples every pixel (best palette, slowest),
# 30 is fastest. Frame count, order, delays and looping are always kept.
encoder_speed = 10
"##
}
