//! Domain types for RSIScan

pub mod series;

pub use series::{PricePoint, PriceSeries, SeriesError};
