//! RSIScan Core: indicators, thresholds, signal classification, trend gate.
//!
//! This crate holds the stateless engine that turns one instrument's daily
//! closes into a `MarketRecord`:
//! - Price series with validated ordering
//! - RSI (Wilder-style EWMA), MA120 and distance above the recent low
//! - Per-symbol buy-limit table with a default
//! - Ordered-rule signal classifier and hysteresis trend gate
//! - Record builder that reports short history instead of inventing values
//!
//! Retrieval lives in `data`; it finishes before the engine runs.

pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod record;
pub mod signal;
pub mod snapshot;
pub mod thresholds;
pub mod trend;

pub use domain::{PricePoint, PriceSeries, SeriesError};
pub use error::EngineError;
pub use record::{EngineSettings, MarketRecord, MarketRecordBuilder, RecordStatus, TrendReading};
pub use signal::{Signal, SignalClassifier, SignalRules};
pub use snapshot::{FeatureFlags, IndicatorCalculator, IndicatorSettings, IndicatorSnapshot};
pub use thresholds::{ThresholdEntry, ThresholdTable, DEFAULT_BUY_LIMIT};
pub use trend::{TrendGate, TrendZone};
