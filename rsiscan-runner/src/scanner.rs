//! Watch-list scan: loaded series in, one record per symbol out.
//!
//! Symbols are evaluated in parallel with rayon. `par_iter().map().collect()`
//! keeps watch-list order no matter which worker finishes first, and a
//! failure for one symbol only affects that symbol's record.

use rayon::prelude::*;
use rsiscan_core::data::DataSource;
use rsiscan_core::{MarketRecord, MarketRecordBuilder, PriceSeries, RecordStatus, Signal};
use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::data_loader::{dataset_hash, LoadedSeries};

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// One record per watch-list symbol, in watch-list order.
    pub records: Vec<MarketRecord>,
    /// Symbols whose record was built on synthetic data.
    pub synthetic: Vec<String>,
    /// BLAKE3 over the loaded input series; `None` when the scan started
    /// from series rather than a load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_hash: Option<String>,
}

/// Record counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub complete: usize,
    pub incomplete: usize,
    pub unavailable: usize,
    pub strong_buy: usize,
    pub strong_sell: usize,
}

impl ScanReport {
    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary::default();
        for record in &self.records {
            match record.status {
                RecordStatus::Complete => summary.complete += 1,
                RecordStatus::Incomplete { .. } => summary.incomplete += 1,
                RecordStatus::Unavailable { .. } => summary.unavailable += 1,
            }
            match record.signal {
                Some(Signal::StrongBuy) => summary.strong_buy += 1,
                Some(Signal::StrongSell) => summary.strong_sell += 1,
                _ => {}
            }
        }
        summary
    }

    pub fn record(&self, symbol: &str) -> Option<&MarketRecord> {
        self.records.iter().find(|r| r.symbol == symbol)
    }

    pub fn is_synthetic(&self, symbol: &str) -> bool {
        self.synthetic.iter().any(|s| s == symbol)
    }

    /// BLAKE3 over the serialized records. Identical inputs and config give
    /// an identical fingerprint.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let mut hasher = blake3::Hasher::new();
        serde_json::to_writer(&mut hasher, &self.records)?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}

/// Scan already-loaded series. Load failures become `Unavailable` records.
pub fn scan(loaded: &[LoadedSeries], config: &ScanConfig) -> ScanReport {
    let builder = MarketRecordBuilder::new(&config.engine_settings());

    let records: Vec<MarketRecord> = loaded
        .par_iter()
        .map(|item| match &item.outcome {
            Ok(result) => builder.build_for(&result.series, &config.thresholds),
            Err(err) => MarketRecord::unavailable(
                item.symbol.clone(),
                config.thresholds.limit_for(&item.symbol),
                err.to_string(),
            ),
        })
        .collect();

    let synthetic = loaded
        .iter()
        .filter(|item| item.source() == Some(DataSource::Synthetic))
        .map(|item| item.symbol.clone())
        .collect();

    finish(records, synthetic, Some(dataset_hash(loaded)))
}

/// Scan series directly, for callers that already hold validated data.
pub fn scan_series(series: &[PriceSeries], config: &ScanConfig) -> ScanReport {
    let builder = MarketRecordBuilder::new(&config.engine_settings());
    let records = series
        .par_iter()
        .map(|s| builder.build_for(s, &config.thresholds))
        .collect();
    finish(records, Vec::new(), None)
}

fn finish(
    records: Vec<MarketRecord>,
    synthetic: Vec<String>,
    dataset_hash: Option<String>,
) -> ScanReport {
    let report = ScanReport {
        records,
        synthetic,
        dataset_hash,
    };
    let summary = report.summary();
    tracing::info!(
        symbols = report.records.len(),
        complete = summary.complete,
        incomplete = summary.incomplete,
        unavailable = summary.unavailable,
        strong_buy = summary.strong_buy,
        strong_sell = summary.strong_sell,
        synthetic = report.synthetic.len(),
        "scan finished"
    );
    report
}
