//! Scan configuration, loaded from TOML.
//!
//! Every section is optional; anything missing falls back to the defaults
//! below, which reproduce the stock watch-list:
//!
//! ```toml
//! watchlist = ["BLOK", "QQQM", "GLXY", "CRCL", "COIN"]
//!
//! [thresholds]
//! default = 30.0
//!
//! [thresholds.symbols]
//! QQQM = 40.0
//! BLOK = 35.0
//!
//! [trend]
//! gray_band_pct = 3.0
//! deep_band_pct = 10.0
//!
//! [notify]
//! webhook_url = "https://example.invalid/hook"
//! ```

use rsiscan_core::snapshot::SettingsError;
use rsiscan_core::thresholds::ThresholdError;
use rsiscan_core::trend::TrendGateError;
use rsiscan_core::{
    EngineSettings, FeatureFlags, IndicatorSettings, SignalRules, ThresholdTable, TrendGate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable that overrides `notify.webhook_url`.
pub const WEBHOOK_ENV_VAR: &str = "RSISCAN_WEBHOOK_URL";

/// Default chunk size for webhook messages.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 2000;

/// Upper bound for `data.lookback_days` (about a century).
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid thresholds: {0}")]
    Threshold(#[from] ThresholdError),

    #[error("invalid indicator settings: {0}")]
    Indicators(#[from] SettingsError),

    #[error("invalid trend gate: {0}")]
    Trend(#[from] TrendGateError),

    #[error("invalid config: {0}")]
    Validation(String),
}

/// How much history to request per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Calendar days back from the scan date. One year covers MA120 with room.
    pub lookback_days: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { lookback_days: 365 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
    pub max_message_len: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

/// Full configuration for one scan.
///
/// `watchlist` comes first so the serialized TOML keeps plain keys ahead of
/// its tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub watchlist: Vec<String>,
    pub thresholds: ThresholdTable,
    pub indicators: IndicatorSettings,
    pub rules: SignalRules,
    pub trend: TrendGate,
    pub features: FeatureFlags,
    pub data: DataConfig,
    pub notify: NotifyConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let limits = [
            ("BLOK", 35.0),
            ("QQQM", 40.0),
            ("GLXY", 30.0),
            ("CRCL", 30.0),
            ("COIN", 30.0),
        ];
        let symbols = limits.iter().map(|(s, l)| (s.to_string(), *l));
        Self {
            watchlist: limits.iter().map(|(s, _)| s.to_string()).collect(),
            thresholds: ThresholdTable::new(rsiscan_core::DEFAULT_BUY_LIMIT, symbols)
                .unwrap_or_default(),
            indicators: IndicatorSettings::default(),
            rules: SignalRules::default(),
            trend: TrendGate::default(),
            features: FeatureFlags::default(),
            data: DataConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load from a TOML file, validate, and apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate a TOML string. Environment is not consulted.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watchlist.is_empty() {
            return Err(ConfigError::Validation("watchlist is empty".into()));
        }
        if let Some(blank) = self.watchlist.iter().find(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "watchlist contains a blank symbol: {blank:?}"
            )));
        }
        self.thresholds.validate()?;
        self.indicators.validate()?;
        self.trend.validate()?;

        let rules = &self.rules;
        if rules.watch_band.is_nan() || rules.watch_band < 0.0 {
            return Err(ConfigError::Validation(format!(
                "rules.watch_band must be non-negative, got {}",
                rules.watch_band
            )));
        }
        if rules.bullish.is_nan() || rules.overbought.is_nan() || rules.bullish > rules.overbought
        {
            return Err(ConfigError::Validation(format!(
                "rules.bullish ({}) must not exceed rules.overbought ({})",
                rules.bullish, rules.overbought
            )));
        }

        if self.notify.max_message_len == 0 {
            return Err(ConfigError::Validation(
                "notify.max_message_len must be at least 1".into(),
            ));
        }
        if self.data.lookback_days == 0 || self.data.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::Validation(format!(
                "data.lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}, got {}",
                self.data.lookback_days
            )));
        }
        Ok(())
    }

    /// Settings handed to `MarketRecordBuilder`.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            indicators: self.indicators,
            rules: self.rules,
            trend: self.trend,
            features: self.features,
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_webhook_override(std::env::var(WEBHOOK_ENV_VAR).ok());
    }

    fn apply_webhook_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            tracing::debug!(var = WEBHOOK_ENV_VAR, "webhook url taken from environment");
            self.notify.webhook_url = Some(url);
        }
    }

    /// Threshold strategy summary for report footers, e.g.
    /// `QQQM:40, BLOK:35, Others:30`. Only limits that differ from the
    /// default are listed, highest first.
    pub fn threshold_summary(&self) -> String {
        let default = self.thresholds.default_limit();
        let mut custom: Vec<(&str, f64)> = self
            .thresholds
            .entries()
            .filter(|(_, limit)| *limit != default)
            .collect();
        custom.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut parts: Vec<String> = custom
            .iter()
            .map(|(symbol, limit)| format!("{symbol}:{limit}"))
            .collect();
        parts.push(format!("Others:{default}"));
        parts.join(", ")
    }
}
