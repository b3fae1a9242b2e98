//! Indicator implementations.
//!
//! Indicators are pure functions over a close-price slice: closes in, a
//! series of the same length out, with `f64::NAN` during warmup. The engine
//! only ever reads the last value, but the full series keeps every indicator
//! testable bar by bar.

pub mod rsi;
pub mod sma;
pub mod support;

pub use rsi::{ewm_mean, Rsi};
pub use sma::Sma;
pub use support::{distance_pct, SupportDistance, SupportReading};

/// Trait for single-series indicators.
///
/// # Look-ahead guard
/// No value at index t may depend on closes at t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g. "rsi_14", "sma_120").
    fn name(&self) -> &str;

    /// Number of points before the first valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole slice.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Strictly rising closes for tests.
#[cfg(test)]
pub fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

/// Strictly falling closes for tests.
#[cfg(test)]
pub fn falling(n: usize) -> Vec<f64> {
    (0..n).map(|i| 200.0 - i as f64).collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
