//! Engine error taxonomy.
//!
//! Every variant is per-instrument: the record builder turns it into an
//! incomplete record and the batch keeps going. A symbol missing from the
//! threshold table is not an error at all (see `thresholds`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Fewer data points than a calculator's minimum window.
    #[error("insufficient history for {indicator}: need {needed} points, have {available}")]
    InsufficientHistory {
        indicator: String,
        needed: usize,
        available: usize,
    },

    /// Degenerate arithmetic input, e.g. a zero low price.
    #[error("domain error: {0}")]
    Domain(String),
}

impl EngineError {
    pub(crate) fn insufficient(
        indicator: impl Into<String>,
        needed: usize,
        available: usize,
    ) -> Self {
        Self::InsufficientHistory {
            indicator: indicator.into(),
            needed,
            available,
        }
    }

    pub fn is_insufficient_history(&self) -> bool {
        matches!(self, Self::InsufficientHistory { .. })
    }
}
