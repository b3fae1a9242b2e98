//! Price retrieval: everything that happens before a series reaches the engine.

pub mod csv_source;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_source::CsvDirProvider;
pub use provider::{DataError, DataSource, FetchResult, PriceProvider};
pub use synthetic::synthetic_series;
pub use yahoo::YahooProvider;
