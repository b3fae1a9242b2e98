//! Synthetic price series for offline demos and tests.
//!
//! A random walk from 100.0 seeded from the symbol name, so the same symbol
//! and range always produce the same series. Callers tag results built on it
//! with `DataSource::Synthetic`.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{PricePoint, PriceSeries};

/// Weekday-only random walk between `start` and `end` inclusive.
pub fn synthetic_series(symbol: &str, start: NaiveDate, end: NaiveDate) -> PriceSeries {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut points = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + daily_return;
            points.push(PricePoint::new(current, price));
        }
        current += chrono::Duration::days(1);
    }

    // Dates strictly increase and a ±3% walk from 100 stays positive.
    PriceSeries::new_unchecked(symbol, points)
}
