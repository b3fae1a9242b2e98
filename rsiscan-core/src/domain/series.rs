//! PriceSeries: the engine's only input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily close for a single symbol on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Reasons a raw point list cannot become a `PriceSeries`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("{symbol}: dates out of order at index {index} ({prev} then {next})")]
    OutOfOrder {
        symbol: String,
        index: usize,
        prev: NaiveDate,
        next: NaiveDate,
    },

    #[error("{symbol}: duplicate date {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },

    #[error("{symbol}: invalid close {close} on {date}")]
    InvalidClose {
        symbol: String,
        date: NaiveDate,
        close: f64,
    },
}

/// Chronological daily closes for one instrument.
///
/// Invariants, checked at construction: dates strictly increase and every
/// close is finite and positive. The series may be empty; calculators report
/// insufficient history rather than the constructor rejecting short input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();

        for p in &points {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(SeriesError::InvalidClose {
                    symbol,
                    date: p.date,
                    close: p.close,
                });
            }
        }

        for (i, pair) in points.windows(2).enumerate() {
            let (prev, next) = (pair[0].date, pair[1].date);
            if prev == next {
                return Err(SeriesError::DuplicateDate { symbol, date: next });
            }
            if prev > next {
                return Err(SeriesError::OutOfOrder {
                    symbol,
                    index: i + 1,
                    prev,
                    next,
                });
            }
        }

        Ok(Self { symbol, points })
    }

    /// Skip validation for callers that construct points in order.
    pub(crate) fn new_unchecked(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Build a series from unordered points: sorts by date and keeps the
    /// last close seen for any repeated date.
    pub fn from_unordered(
        symbol: impl Into<String>,
        mut points: Vec<PricePoint>,
    ) -> Result<Self, SeriesError> {
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for p in points {
            match deduped.last_mut() {
                Some(last) if last.date == p.date => *last = p,
                _ => deduped.push(p),
            }
        }
        Self::new(symbol, deduped)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Last close, if any.
    pub fn current_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// The most recent `n` points (all of them when the series is shorter).
    pub fn tail(&self, n: usize) -> &[PricePoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}
