//! Simple Moving Average (SMA).
//!
//! Rolling mean of closes over a fixed window. Never averages a partial
//! window: fewer points than the window yields NaN / insufficient history.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;
use crate::error::EngineError;

/// Default trend reference window (MA120).
pub const DEFAULT_MA_WINDOW: usize = 120;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Mean of the most recent `period` closes.
    pub fn latest(&self, closes: &[f64]) -> Result<f64, EngineError> {
        let n = closes.len();
        if n < self.period {
            return Err(EngineError::insufficient(&self.name, self.period, n));
        }
        let window = &closes[n - self.period..];
        Ok(window.iter().sum::<f64>() / self.period as f64)
    }
}

impl Default for Sma {
    fn default() -> Self {
        Self::new(DEFAULT_MA_WINDOW)
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let mut sum: f64 = closes[..self.period].iter().sum();
        result[self.period - 1] = sum / self.period as f64;

        // Roll the window forward
        for i in self.period..n {
            sum += closes[i] - closes[i - self.period];
            result[i] = sum / self.period as f64;
        }

        result
    }
}
