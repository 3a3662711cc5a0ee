//! Target aspect ratios.
//!
//! A [`Ratio`] is a pair of positive integers `(width, height)`. Callers pick
//! one either from the fixed presets offered in the UI or from two free-form
//! text fields, captured as a [`RatioSelection`] and resolved before any file
//! is touched:
//!
//! ```text
//! Preset(16:9)                  → Ratio { width: 16, height: 9 }
//! Custom { "21", "9" }          → Ratio { width: 21, height: 9 }
//! Custom { "abc", "9" }         → RatioError::NotANumber
//! Custom { "0", "9" }           → RatioError::NotPositive
//! ```
//!
//! Ratios are not reduced: `32:18` and `16:9` describe the same aspect and
//! produce identical fit sizes, but keep their spelling for display.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatioError {
    #[error("ratio {field} {value:?} is not a whole number")]
    NotANumber { field: &'static str, value: String },
    #[error("ratio {field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("invalid ratio {0:?}: expected WIDTH:HEIGHT, e.g. 16:9")]
    Malformed(String),
}

/// Aspect ratio as `width:height`, both components strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ratio {
    width: u32,
    height: u32,
}

impl Ratio {
    pub const SQUARE: Ratio = Ratio {
        width: 1,
        height: 1,
    };
    pub const STANDARD: Ratio = Ratio {
        width: 4,
        height: 3,
    };
    pub const WIDESCREEN: Ratio = Ratio {
        width: 16,
        height: 9,
    };

    pub fn new(width: u32, height: u32) -> Result<Self, RatioError> {
        if width == 0 {
            return Err(RatioError::NotPositive { field: "width" });
        }
        if height == 0 {
            return Err(RatioError::NotPositive { field: "height" });
        }
        Ok(Self { width, height })
    }

    /// Build a ratio from two raw text inputs (the "Custom" fields).
    ///
    /// Surrounding whitespace is ignored. Anything that is not a positive
    /// integer is rejected; negative numbers report as non-positive rather
    /// than as parse failures.
    pub fn from_fields(width: &str, height: &str) -> Result<Self, RatioError> {
        let w = parse_component("width", width)?;
        let h = parse_component("height", height)?;
        Self::new(w, h)
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }
}

impl Default for Ratio {
    fn default() -> Self {
        RatioPreset::default().ratio()
    }
}

fn parse_component(field: &'static str, raw: &str) -> Result<u32, RatioError> {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) if n <= 0 => Err(RatioError::NotPositive { field }),
        Ok(n) => u32::try_from(n).map_err(|_| RatioError::NotANumber {
            field,
            value: raw.to_string(),
        }),
        Err(_) => Err(RatioError::NotANumber {
            field,
            value: raw.to_string(),
        }),
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for Ratio {
    type Err = RatioError;

    /// Parse `"W:H"`. `x` and `/` are accepted as separators too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once([':', 'x', '/'])
            .ok_or_else(|| RatioError::Malformed(s.to_string()))?;
        Self::from_fields(w, h)
    }
}

impl TryFrom<String> for Ratio {
    type Error = RatioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ratio> for String {
    fn from(ratio: Ratio) -> Self {
        ratio.to_string()
    }
}

/// The fixed ratios offered next to the "Custom" option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RatioPreset {
    Square,
    Standard,
    #[default]
    Widescreen,
}

impl RatioPreset {
    pub const ALL: [RatioPreset; 3] = [
        RatioPreset::Square,
        RatioPreset::Standard,
        RatioPreset::Widescreen,
    ];

    pub fn ratio(self) -> Ratio {
        match self {
            RatioPreset::Square => Ratio::SQUARE,
            RatioPreset::Standard => Ratio::STANDARD,
            RatioPreset::Widescreen => Ratio::WIDESCREEN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RatioPreset::Square => "1:1",
            RatioPreset::Standard => "4:3",
            RatioPreset::Widescreen => "16:9",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label.trim())
    }
}

/// What the caller selected: a preset, or the raw contents of the two
/// custom fields. Resolution happens once, before a run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatioSelection {
    Preset(RatioPreset),
    Custom { width: String, height: String },
}

impl RatioSelection {
    pub fn resolve(&self) -> Result<Ratio, RatioError> {
        match self {
            RatioSelection::Preset(preset) => Ok(preset.ratio()),
            RatioSelection::Custom { width, height } => Ratio::from_fields(width, height),
        }
    }
}
