//! Error handling for pipeline operations.
//!
//! Provides one error type covering source failures, extraction failures,
//! and pipeline misuse, with enough context to identify the failing stage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Failed to connect to data source '{descriptor}'")]
    DatabaseConnection {
        descriptor: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Query failed against '{descriptor}'")]
    QueryFailed {
        descriptor: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Query against '{descriptor}' returned no rows")]
    EmptyQueryResult { descriptor: String },

    #[error("Column '{column}' has unsupported declared type '{type_name}'")]
    UnsupportedColumnType { column: String, type_name: String },

    #[error("Request failed for {url}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} fetching {url}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Remote file at {url} contains no rows")]
    EmptyRemoteFile { url: String },

    #[error("Remote file at {url} is not valid delimited text")]
    InvalidRemoteFile {
        url: String,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("Pattern for measurement kind '{kind}' is not a valid regex")]
    InvalidPattern {
        kind: String,
        #[source]
        source: regex::Error,
    },

    #[error("Pattern '{kind}' matched message '{message}' but populated no capture group")]
    EmptyCapture { kind: String, message: String },

    #[error("Captured text '{capture}' for measurement kind '{kind}' is not numeric")]
    NumericCapture {
        kind: String,
        capture: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Column '{column}' not found during {operation}")]
    MissingColumn { column: String, operation: String },

    #[error("Measurements have not been extracted; process messages before aggregating")]
    MeasurementsNotExtracted,

    #[error("No data loaded; ingest a source before calling {operation}")]
    DataNotLoaded { operation: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            operation: operation.into(),
        }
    }

    pub fn data_not_loaded(operation: impl Into<String>) -> Self {
        Self::DataNotLoaded {
            operation: operation.into(),
        }
    }
}

impl From<::config::ConfigError> for EtlError {
    fn from(error: ::config::ConfigError) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
