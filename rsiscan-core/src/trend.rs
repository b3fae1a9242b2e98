//! Trend gate: price vs. the long moving average with a hysteresis buffer.
//!
//! A gray band around the MA keeps the zone from flip-flopping when price
//! hugs the line. GRAY_ZONE means "trend unconfirmed": downstream policy
//! treats it as hold, never as a sell trigger.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendZone {
    StrongBull,
    GrayZone,
    Bearish,
    DeepBearish,
}

impl TrendZone {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongBull => "STRONG_BULL",
            Self::GrayZone => "GRAY_ZONE",
            Self::Bearish => "BEARISH",
            Self::DeepBearish => "DEEP_BEARISH",
        }
    }

    /// Whether a sell decision may be triggered by this zone.
    pub fn allows_sell(&self) -> bool {
        matches!(self, Self::Bearish | Self::DeepBearish)
    }
}

impl fmt::Display for TrendZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendGateError {
    #[error("gray band must be a non-negative number, got {0}")]
    InvalidGrayBand(f64),

    #[error("deep band ({deep}) must be at least the gray band ({gray})")]
    DeepInsideGray { gray: f64, deep: f64 },
}

/// Zone boundaries in percent of the MA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendGate {
    pub gray_band_pct: f64,
    pub deep_band_pct: f64,
}

impl Default for TrendGate {
    fn default() -> Self {
        Self {
            gray_band_pct: 3.0,
            deep_band_pct: 10.0,
        }
    }
}

impl TrendGate {
    pub fn new(gray_band_pct: f64, deep_band_pct: f64) -> Result<Self, TrendGateError> {
        let gate = Self {
            gray_band_pct,
            deep_band_pct,
        };
        gate.validate()?;
        Ok(gate)
    }

    pub fn validate(&self) -> Result<(), TrendGateError> {
        if !self.gray_band_pct.is_finite() || self.gray_band_pct < 0.0 {
            return Err(TrendGateError::InvalidGrayBand(self.gray_band_pct));
        }
        if self.deep_band_pct.is_nan() || self.deep_band_pct < self.gray_band_pct {
            return Err(TrendGateError::DeepInsideGray {
                gray: self.gray_band_pct,
                deep: self.deep_band_pct,
            });
        }
        Ok(())
    }

    pub fn classify(&self, gap_pct: f64) -> TrendZone {
        if gap_pct > self.gray_band_pct {
            TrendZone::StrongBull
        } else if gap_pct >= -self.gray_band_pct {
            TrendZone::GrayZone
        } else if gap_pct >= -self.deep_band_pct {
            TrendZone::Bearish
        } else {
            TrendZone::DeepBearish
        }
    }
}

/// Percent gap of `price` over the moving average.
pub fn gap_pct(price: f64, ma: f64) -> Result<f64, EngineError> {
    if !ma.is_finite() || ma <= 0.0 {
        return Err(EngineError::Domain(format!(
            "moving average must be positive, got {ma}"
        )));
    }
    Ok((price - ma) * 100.0 / ma)
}
