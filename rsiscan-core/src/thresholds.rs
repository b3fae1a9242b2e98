//! Per-symbol buy-RSI limits.
//!
//! Index ETFs tolerate a looser limit than single stocks. The difference is
//! carried as data so that adding an instrument never means adding a branch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Limit used for any symbol missing from the table.
pub const DEFAULT_BUY_LIMIT: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("buy limit for '{symbol}' must be within [0, 100], got {limit}")]
    OutOfRange { symbol: String, limit: f64 },
}

/// One instrument's resolved buy limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub symbol: String,
    pub limit: f64,
    /// False when the limit came from the table default.
    pub configured: bool,
}

/// Immutable symbol → buy-RSI-limit map with a fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdTable {
    default: f64,
    symbols: BTreeMap<String, f64>,
}

impl ThresholdTable {
    pub fn new(
        default: f64,
        symbols: impl IntoIterator<Item = (String, f64)>,
    ) -> Result<Self, ThresholdError> {
        let table = Self {
            default,
            symbols: symbols.into_iter().collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Check every limit (including the default) lies in [0, 100].
    pub fn validate(&self) -> Result<(), ThresholdError> {
        check_limit("<default>", self.default)?;
        for (symbol, &limit) in &self.symbols {
            check_limit(symbol, limit)?;
        }
        Ok(())
    }

    /// Configured limit for `symbol`, or the default when unconfigured.
    pub fn limit_for(&self, symbol: &str) -> f64 {
        match self.symbols.get(symbol) {
            Some(&limit) => limit,
            None => {
                tracing::debug!(
                    symbol,
                    default = self.default,
                    "no buy limit configured, using default"
                );
                self.default
            }
        }
    }

    /// Resolve `symbol` into an entry, falling back to the default.
    pub fn entry(&self, symbol: &str) -> ThresholdEntry {
        ThresholdEntry {
            symbol: symbol.to_string(),
            limit: self.limit_for(symbol),
            configured: self.is_configured(symbol),
        }
    }

    pub fn is_configured(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    pub fn default_limit(&self) -> f64 {
        self.default
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.symbols.iter().map(|(s, &l)| (s.as_str(), l))
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            default: DEFAULT_BUY_LIMIT,
            symbols: BTreeMap::new(),
        }
    }
}

fn check_limit(symbol: &str, limit: f64) -> Result<(), ThresholdError> {
    if (0.0..=100.0).contains(&limit) {
        Ok(())
    } else {
        Err(ThresholdError::OutOfRange {
            symbol: symbol.to_string(),
            limit,
        })
    }
}
