//! Structured scan payload (JSON).
//!
//! Plain values only: labels are the stable machine names and no field ever
//! carries terminal markup.

use chrono::NaiveDateTime;
use rsiscan_core::{MarketRecord, RecordStatus, Signal, TrendZone};
use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::scanner::ScanReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadRow {
    pub symbol: String,
    /// `complete`, `incomplete` or `unavailable`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub price: Option<f64>,
    pub rsi: Option<f64>,
    pub buy_limit: f64,
    pub ma: Option<f64>,
    pub trend_zone: Option<TrendZone>,
    pub trend_gap_pct: Option<f64>,
    pub distance_from_low_pct: Option<f64>,
    pub signal: Option<Signal>,
    pub synthetic: bool,
}

impl PayloadRow {
    pub fn from_record(record: &MarketRecord, synthetic: bool) -> Self {
        let status = match &record.status {
            RecordStatus::Complete => "complete",
            RecordStatus::Incomplete { .. } => "incomplete",
            RecordStatus::Unavailable { .. } => "unavailable",
        };
        Self {
            symbol: record.symbol.clone(),
            status: status.to_string(),
            reason: record.failure_reason().map(str::to_string),
            price: record.price,
            rsi: record.rsi,
            buy_limit: record.buy_limit,
            ma: record.trend.map(|t| t.ma),
            trend_zone: record.trend.map(|t| t.zone),
            trend_gap_pct: record.trend.map(|t| t.gap_pct),
            distance_from_low_pct: record.support.map(|s| s.distance_pct),
            signal: record.signal,
            synthetic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPayload {
    pub executed_at: String,
    pub strategy: String,
    /// BLAKE3 over the records; equal for identical inputs and config.
    pub fingerprint: String,
    /// BLAKE3 over the input series, when the scan loaded them itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_hash: Option<String>,
    pub rows: Vec<PayloadRow>,
}

pub fn build_payload(
    report: &ScanReport,
    config: &ScanConfig,
    executed_at: NaiveDateTime,
) -> Result<ScanPayload, serde_json::Error> {
    Ok(ScanPayload {
        executed_at: executed_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        strategy: config.threshold_summary(),
        fingerprint: report.fingerprint()?,
        dataset_hash: report.dataset_hash.clone(),
        rows: report
            .records
            .iter()
            .map(|r| PayloadRow::from_record(r, report.is_synthetic(&r.symbol)))
            .collect(),
    })
}

pub fn payload_json(payload: &ScanPayload) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}
