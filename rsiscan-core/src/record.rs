//! MarketRecord: one instrument's classification for one run.
//!
//! Records are built once and never mutated. A failure in any calculator
//! yields an `Incomplete` record that carries the reason and leaves the
//! RSI, signal, trend and support fields empty: never placeholder zeros.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::error::EngineError;
use crate::indicators::SupportReading;
use crate::signal::{Signal, SignalClassifier, SignalRules};
use crate::snapshot::{FeatureFlags, IndicatorCalculator, IndicatorSettings};
use crate::thresholds::{ThresholdEntry, ThresholdTable};
use crate::trend::{gap_pct, TrendGate, TrendZone};

/// Whether a record carries the full feature set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecordStatus {
    Complete,
    /// Series present but a calculator could not run (e.g. short history).
    Incomplete { reason: String },
    /// No usable series at all (retrieval or validation failed).
    Unavailable { reason: String },
}

/// Price vs. the trend reference line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub ma: f64,
    pub gap_pct: f64,
    pub zone: TrendZone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub symbol: String,
    pub status: RecordStatus,
    pub as_of: Option<NaiveDate>,
    pub price: Option<f64>,
    pub buy_limit: f64,
    pub rsi: Option<f64>,
    pub signal: Option<Signal>,
    pub trend: Option<TrendReading>,
    pub support: Option<SupportReading>,
}

impl MarketRecord {
    /// Terminal record for a symbol whose series never reached the engine.
    pub fn unavailable(
        symbol: impl Into<String>,
        buy_limit: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            status: RecordStatus::Unavailable {
                reason: reason.into(),
            },
            as_of: None,
            price: None,
            buy_limit,
            rsi: None,
            signal: None,
            trend: None,
            support: None,
        }
    }

    fn incomplete(series: &PriceSeries, buy_limit: f64, err: &EngineError) -> Self {
        Self {
            symbol: series.symbol().to_string(),
            status: RecordStatus::Incomplete {
                reason: err.to_string(),
            },
            as_of: series.last_date(),
            price: series.current_price(),
            buy_limit,
            rsi: None,
            signal: None,
            trend: None,
            support: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == RecordStatus::Complete
    }

    /// Reason text for incomplete or unavailable records.
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            RecordStatus::Complete => None,
            RecordStatus::Incomplete { reason } | RecordStatus::Unavailable { reason } => {
                Some(reason)
            }
        }
    }
}

/// Everything the record builder needs besides the series and its limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub indicators: IndicatorSettings,
    pub rules: SignalRules,
    pub trend: TrendGate,
    pub features: FeatureFlags,
}

/// Runs the calculators, the classifier and the trend gate for one series.
#[derive(Debug, Clone)]
pub struct MarketRecordBuilder {
    calculator: IndicatorCalculator,
    classifier: SignalClassifier,
    gate: TrendGate,
    trend_gate: bool,
}

impl MarketRecordBuilder {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            calculator: IndicatorCalculator::new(&settings.indicators, settings.features),
            classifier: SignalClassifier::new(&settings.rules),
            gate: settings.trend,
            trend_gate: settings.features.trend_gate,
        }
    }

    /// Build the record for `series`, resolving its limit from `table`.
    pub fn build_for(&self, series: &PriceSeries, table: &ThresholdTable) -> MarketRecord {
        self.build(series, &table.entry(series.symbol()))
    }

    pub fn build(&self, series: &PriceSeries, threshold: &ThresholdEntry) -> MarketRecord {
        match self.evaluate(series, threshold.limit) {
            Ok(record) => record,
            Err(err) => MarketRecord::incomplete(series, threshold.limit, &err),
        }
    }

    fn evaluate(&self, series: &PriceSeries, limit: f64) -> Result<MarketRecord, EngineError> {
        let snap = self.calculator.snapshot(series)?;

        let trend = if self.trend_gate {
            let ma = snap.ma.ok_or_else(|| {
                EngineError::insufficient(
                    format!("sma_{}", self.calculator.ma_window()),
                    self.calculator.ma_window(),
                    series.len(),
                )
            })?;
            let gap = gap_pct(snap.price, ma)?;
            Some(TrendReading {
                ma,
                gap_pct: gap,
                zone: self.gate.classify(gap),
            })
        } else {
            None
        };

        Ok(MarketRecord {
            symbol: series.symbol().to_string(),
            status: RecordStatus::Complete,
            as_of: series.last_date(),
            price: Some(snap.price),
            buy_limit: limit,
            rsi: Some(snap.rsi),
            signal: Some(self.classifier.classify(snap.rsi, limit)),
            trend,
            support: snap.support,
        })
    }
}

impl Default for MarketRecordBuilder {
    fn default() -> Self {
        Self::new(&EngineSettings::default())
    }
}
