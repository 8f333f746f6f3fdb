//! Agricultural Survey Processor Library
//!
//! A Rust library for cleaning agricultural field survey records and
//! aggregating weather station sensor readings.
//!
//! This library provides tools for:
//! - Ingesting survey rows from a relational source and delimited files
//!   fetched over HTTP
//! - Repairing known data-quality defects: mutually swapped column
//!   labels, sign-flipped elevations, misspelled crop-type labels
//! - Extracting typed (kind, value) measurements from free-text sensor
//!   messages with an ordered regex pattern table
//! - Aggregating mean measurement values per weather station

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod ingest;
pub mod models;
pub mod weather;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{EtlError, Result};
pub use field::FieldDataProcessor;
pub use models::Measurement;
pub use weather::WeatherDataProcessor;
