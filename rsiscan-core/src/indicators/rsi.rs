//! Relative Strength Index (RSI).
//!
//! Wilder-style smoothing expressed as an exponentially weighted mean with
//! alpha = 1/period (center of mass period-1) and no bias correction:
//! avg[0] = x[0], avg[i] = avg[i-1] + alpha * (x[i] - avg[i-1]).
//! The up/down averages are seeded from the first price change, so the first
//! valid RSI sits at index 1.
//! RSI = 100 - 100 / (1 + avg_up / avg_down)
//! Edge cases: avg_down == 0 → 100; both zero (flat history) → 50.

use super::Indicator;
use crate::error::EngineError;

/// Default RSI period (center of mass 13).
pub const DEFAULT_RSI_PERIOD: usize = 14;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Smoothing constant.
    pub fn alpha(&self) -> f64 {
        1.0 / self.period as f64
    }

    /// RSI at the last index.
    pub fn latest(&self, closes: &[f64]) -> Result<f64, EngineError> {
        if closes.len() < 2 {
            return Err(EngineError::insufficient(&self.name, 2, closes.len()));
        }
        let value = self.compute(closes).last().copied().unwrap_or(f64::NAN);
        if value.is_nan() {
            return Err(EngineError::Domain(format!(
                "{} is undefined for the given closes",
                self.name
            )));
        }
        Ok(value)
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(DEFAULT_RSI_PERIOD)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];

        if n < 2 {
            return result;
        }

        let (ups, downs): (Vec<f64>, Vec<f64>) = closes
            .windows(2)
            .map(|w| {
                let change = w[1] - w[0];
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let alpha = self.alpha();
        let avg_up = ewm_mean(&ups, alpha);
        let avg_down = ewm_mean(&downs, alpha);

        for (i, (&up, &down)) in avg_up.iter().zip(&avg_down).enumerate() {
            result[i + 1] = compute_rsi(up, down);
        }

        result
    }
}

/// Exponentially weighted mean without bias correction.
///
/// Seeded from the first value. A NaN input poisons every later output.
pub fn ewm_mean(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let next = match prev {
            None => x,
            Some(avg) => avg + alpha * (x - avg),
        };
        result.push(next);
        prev = Some(next);
    }

    result
}

fn compute_rsi(avg_up: f64, avg_down: f64) -> f64 {
    if avg_up.is_nan() || avg_down.is_nan() {
        f64::NAN
    } else if avg_down == 0.0 && avg_up == 0.0 {
        50.0 // no movement
    } else if avg_down == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_up / avg_down)
    }
}
