//! RSIScan Runner: watch-list scans, configuration, reports, delivery.
//!
//! This crate builds on `rsiscan-core` to provide:
//! - TOML scan configuration with validated defaults
//! - Per-symbol series loading with synthetic fallback
//! - Parallel, order-preserving scans with BLAKE3 fingerprints
//! - Console table and JSON payload rendering
//! - Chunked webhook delivery

pub mod config;
pub mod data_loader;
pub mod notify;
pub mod reporting;
pub mod scanner;

pub use config::{
    ConfigError, DataConfig, NotifyConfig, ScanConfig, MAX_LOOKBACK_DAYS, WEBHOOK_ENV_VAR,
};
pub use data_loader::{dataset_hash, load_watchlist, LoadError, LoadOptions, LoadedSeries};
pub use notify::{deliver, split_message, Notifier, NotifyError, WebhookNotifier};
pub use reporting::{build_payload, payload_json, render_table, Palette, ScanPayload};
pub use scanner::{scan, scan_series, ScanReport, ScanSummary};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ScanConfig>();
        assert_sync::<ScanConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn scan_types_are_send_sync() {
        assert_send::<LoadedSeries>();
        assert_sync::<LoadedSeries>();
        assert_send::<ScanReport>();
        assert_sync::<ScanReport>();
        assert_send::<ScanPayload>();
        assert_sync::<ScanPayload>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
        assert_send::<NotifyError>();
        assert_sync::<NotifyError>();
    }

    #[test]
    fn webhook_notifier_is_send_sync() {
        assert_send::<WebhookNotifier>();
        assert_sync::<WebhookNotifier>();
    }
}
