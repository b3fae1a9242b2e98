//! Distance above the recent-window low.
//!
//! low = min(close) over the last `window` points (a quarter-year of trading
//! days by default); distance = (current - low) / low * 100, where current is
//! the last close of the full series.

use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::error::EngineError;

/// Default support window: ~90 trading days.
pub const DEFAULT_SUPPORT_WINDOW: usize = 90;

/// Recent low and how far the current price sits above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportReading {
    pub low: f64,
    pub distance_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportDistance {
    window: usize,
}

impl SupportDistance {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "support window must be >= 1");
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn measure(&self, series: &PriceSeries) -> Result<SupportReading, EngineError> {
        let recent = series.tail(self.window);
        let current = series
            .current_price()
            .ok_or_else(|| EngineError::insufficient("support_low", 1, 0))?;

        let low = recent
            .iter()
            .map(|p| p.close)
            .fold(f64::INFINITY, f64::min);

        Ok(SupportReading {
            low,
            distance_pct: distance_pct(current, low)?,
        })
    }
}

impl Default for SupportDistance {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPORT_WINDOW)
    }
}

/// Percentage distance of `price` above `low`.
pub fn distance_pct(price: f64, low: f64) -> Result<f64, EngineError> {
    if !low.is_finite() || low <= 0.0 {
        return Err(EngineError::Domain(format!(
            "support low must be positive, got {low}"
        )));
    }
    Ok((price - low) * 100.0 / low)
}
