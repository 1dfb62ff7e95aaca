// Threshold state and the fat classifier

pub mod classifier;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Threshold applied when none is configured
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Mask value marking a pixel as part of the region of interest
pub const SELECTED: u8 = 255;

/// Comparison direction used to decide whether a pixel counts as fat.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// Pixel is strictly brighter than the threshold
    #[default]
    Above,

    /// Pixel is strictly darker than the threshold
    Below,
}

impl ThresholdMode {
    pub fn toggled(self) -> Self {
        match self {
            ThresholdMode::Above => ThresholdMode::Below,
            ThresholdMode::Below => ThresholdMode::Above,
        }
    }

    /// Whether a pixel of intensity `value` satisfies this mode at `threshold`.
    #[inline]
    pub fn admits(self, value: u8, threshold: u8) -> bool {
        match self {
            ThresholdMode::Above => value > threshold,
            ThresholdMode::Below => value < threshold,
        }
    }
}

impl fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdMode::Above => write!(f, "Above"),
            ThresholdMode::Below => write!(f, "Below"),
        }
    }
}

impl FromStr for ThresholdMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "above" => Ok(ThresholdMode::Above),
            "below" => Ok(ThresholdMode::Below),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

/// The user-controlled classification parameters.
///
/// The threshold is a `u8`, so every value it can hold is a valid gray level.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdState {
    pub threshold: u8,
    pub mode: ThresholdMode,
}

impl ThresholdState {
    pub fn new(threshold: u8, mode: ThresholdMode) -> Self {
        Self { threshold, mode }
    }
}

impl Default for ThresholdState {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, ThresholdMode::default())
    }
}
