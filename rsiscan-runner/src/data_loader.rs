//! Series loading for the scan.
//!
//! Every watch-list symbol is resolved independently:
//! 1. If a provider is configured, fetch from it
//! 2. If that fails (or there is no provider) and synthetic fallback is on,
//!    generate a synthetic series (tagged `DataSource::Synthetic`)
//! 3. Otherwise record the error for that symbol and move on
//!
//! A failure for one symbol never stops the others from loading.

use chrono::NaiveDate;
use rsiscan_core::data::{synthetic_series, DataError, DataSource, FetchResult, PriceProvider};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load '{symbol}' from {provider}: {source}")]
    Fetch {
        symbol: String,
        provider: String,
        #[source]
        source: DataError,
    },

    #[error("no data source for '{symbol}' (offline and synthetic fallback disabled)")]
    NoSource { symbol: String },

    #[error("lookback of {days} days from {end} is outside the supported date range")]
    WindowOutOfRange { end: NaiveDate, days: u32 },
}

/// Options controlling how series are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// First day requested (inclusive).
    pub start: NaiveDate,
    /// Last day requested (inclusive).
    pub end: NaiveDate,
    /// Generate a synthetic series when the provider cannot supply one.
    pub synthetic_fallback: bool,
}

impl LoadOptions {
    /// Window of `lookback_days` calendar days ending at `end`.
    pub fn lookback(
        end: NaiveDate,
        lookback_days: u32,
        synthetic_fallback: bool,
    ) -> Result<Self, LoadError> {
        let start = end
            .checked_sub_signed(chrono::Duration::days(i64::from(lookback_days)))
            .ok_or(LoadError::WindowOutOfRange {
                end,
                days: lookback_days,
            })?;
        Ok(Self {
            start,
            end,
            synthetic_fallback,
        })
    }
}

/// Outcome of loading one symbol.
#[derive(Debug)]
pub struct LoadedSeries {
    pub symbol: String,
    pub outcome: Result<FetchResult, LoadError>,
}

impl LoadedSeries {
    pub fn source(&self) -> Option<DataSource> {
        self.outcome.as_ref().ok().map(|r| r.source)
    }
}

/// Load every symbol in watch-list order.
pub fn load_watchlist(
    symbols: &[String],
    provider: Option<&dyn PriceProvider>,
    opts: &LoadOptions,
) -> Vec<LoadedSeries> {
    symbols
        .iter()
        .map(|symbol| LoadedSeries {
            symbol: symbol.clone(),
            outcome: load_symbol(symbol, provider, opts),
        })
        .collect()
}

fn load_symbol(
    symbol: &str,
    provider: Option<&dyn PriceProvider>,
    opts: &LoadOptions,
) -> Result<FetchResult, LoadError> {
    let primary = provider.map(|p| {
        p.fetch(symbol, opts.start, opts.end)
            .map_err(|source| LoadError::Fetch {
                symbol: symbol.to_string(),
                provider: p.name().to_string(),
                source,
            })
    });

    match primary {
        Some(Ok(result)) => {
            tracing::debug!(
                symbol,
                points = result.series.len(),
                source = ?result.source,
                "loaded"
            );
            Ok(result)
        }
        Some(Err(err)) if opts.synthetic_fallback => {
            tracing::warn!(symbol, error = %err, "falling back to synthetic series");
            Ok(synthetic(symbol, opts))
        }
        Some(Err(err)) => {
            tracing::warn!(symbol, error = %err, "load failed");
            Err(err)
        }
        None if opts.synthetic_fallback => {
            tracing::warn!(symbol, "no provider, using synthetic series");
            Ok(synthetic(symbol, opts))
        }
        None => Err(LoadError::NoSource {
            symbol: symbol.to_string(),
        }),
    }
}

fn synthetic(symbol: &str, opts: &LoadOptions) -> FetchResult {
    FetchResult {
        series: synthetic_series(symbol, opts.start, opts.end),
        source: DataSource::Synthetic,
    }
}

/// Deterministic BLAKE3 hash over every loaded close, in watch-list order.
///
/// Failed symbols contribute only their name, so a changed failure set
/// still changes the hash.
pub fn dataset_hash(loaded: &[LoadedSeries]) -> String {
    let mut hasher = blake3::Hasher::new();
    for item in loaded {
        hasher.update(item.symbol.as_bytes());
        if let Ok(result) = &item.outcome {
            for p in result.series.points() {
                hasher.update(p.date.to_string().as_bytes());
                hasher.update(&p.close.to_le_bytes());
            }
        }
    }
    hasher.finalize().to_hex().to_string()
}
