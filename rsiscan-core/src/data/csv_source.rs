//! CSV directory provider.
//!
//! Reads `<dir>/<SYMBOL>.csv` with a header row containing a date column
//! (`date` / `Date`) and a close column (`close` / `Close`). Extra columns
//! are ignored, so a raw Yahoo export works as-is.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::provider::{DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::{PricePoint, PriceSeries};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Close")]
    close: f64,
}

#[derive(Debug, Clone)]
pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    /// Read every row of a CSV file into a series.
    pub fn read_file(symbol: &str, path: &Path) -> Result<PriceSeries, DataError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
        let mut points = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| csv_error(path, e))?;
            points.push(PricePoint::new(row.date, row.close));
        }
        Ok(PriceSeries::from_unordered(symbol, points)?)
    }
}

fn csv_error(path: &Path, e: csv::Error) -> DataError {
    if e.is_io_error() {
        DataError::Io(e.into())
    } else {
        DataError::Parse(format!("{}: {e}", path.display()))
    }
}

impl PriceProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_dir"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let full = Self::read_file(symbol, &path)?;
        let points: Vec<PricePoint> = full
            .points()
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();

        if points.is_empty() {
            return Err(DataError::EmptyRange {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        Ok(FetchResult {
            series: PriceSeries::new(symbol, points)?,
            source: DataSource::CsvImport,
        })
    }
}
