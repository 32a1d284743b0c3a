//! Market data for the bad-tick simulation.
//!
//! This crate provides:
//! - A Yahoo Finance chart client that fetches the base OHLCV series
//! - CSV storage for raw and scored series
//! - `SeriesSource` implementations backed by either of the above

pub mod csv_storage;
pub mod source;
pub mod yahoo;

pub use csv_storage::CsvStorage;
pub use source::{CsvSource, YahooSource};
pub use yahoo::{FetchError, FetchWindow, YahooFinance};
