//! Indicator snapshot: the numeric features of one series at its last bar.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PriceSeries;
use crate::error::EngineError;
use crate::indicators::rsi::DEFAULT_RSI_PERIOD;
use crate::indicators::sma::DEFAULT_MA_WINDOW;
use crate::indicators::support::DEFAULT_SUPPORT_WINDOW;
use crate::indicators::{Rsi, Sma, SupportDistance, SupportReading};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{0} must be at least 1")]
    ZeroWindow(&'static str),
}

/// Indicator windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub ma_window: usize,
    pub support_window: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            ma_window: DEFAULT_MA_WINDOW,
            support_window: DEFAULT_SUPPORT_WINDOW,
        }
    }
}

impl IndicatorSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.rsi_period == 0 {
            return Err(SettingsError::ZeroWindow("rsi_period"));
        }
        if self.ma_window == 0 {
            return Err(SettingsError::ZeroWindow("ma_window"));
        }
        if self.support_window == 0 {
            return Err(SettingsError::ZeroWindow("support_window"));
        }
        Ok(())
    }
}

/// Optional engine modules. Disabled modules neither run nor impose their
/// history requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub support_distance: bool,
    pub trend_gate: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            support_distance: true,
            trend_gate: true,
        }
    }
}

/// Features of one instrument at its latest point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub rsi: f64,
    /// `None` when the trend gate is off or the series is shorter than the
    /// MA window.
    pub ma: Option<f64>,
    /// `None` when support distance is off.
    pub support: Option<SupportReading>,
}

/// Turns a price series into an `IndicatorSnapshot`.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    rsi: Rsi,
    ma: Option<Sma>,
    support: Option<SupportDistance>,
    ma_window: usize,
}

impl IndicatorCalculator {
    /// Panics on zero windows; validate settings loaded from config first.
    pub fn new(settings: &IndicatorSettings, features: FeatureFlags) -> Self {
        Self {
            rsi: Rsi::new(settings.rsi_period),
            ma: features.trend_gate.then(|| Sma::new(settings.ma_window)),
            support: features
                .support_distance
                .then(|| SupportDistance::new(settings.support_window)),
            ma_window: settings.ma_window,
        }
    }

    pub fn ma_window(&self) -> usize {
        self.ma_window
    }

    /// Fails when RSI cannot be computed (fewer than 2 points). A short MA
    /// window is not a failure here: it shows up as `ma: None`.
    pub fn snapshot(&self, series: &PriceSeries) -> Result<IndicatorSnapshot, EngineError> {
        let closes = series.closes();
        let price = series
            .current_price()
            .ok_or_else(|| EngineError::insufficient("price", 1, 0))?;
        let rsi = self.rsi.latest(&closes)?;
        let ma = match self.ma.as_ref().map(|sma| sma.latest(&closes)) {
            Some(Ok(ma)) => Some(ma),
            Some(Err(e)) if e.is_insufficient_history() => None,
            Some(Err(e)) => return Err(e),
            None => None,
        };
        let support = self
            .support
            .as_ref()
            .map(|s| s.measure(series))
            .transpose()?;

        Ok(IndicatorSnapshot {
            price,
            rsi,
            ma,
            support,
        })
    }
}

impl Default for IndicatorCalculator {
    fn default() -> Self {
        Self::new(&IndicatorSettings::default(), FeatureFlags::default())
    }
}
