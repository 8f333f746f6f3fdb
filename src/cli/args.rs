//! Command-line argument definitions for the survey processor.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{EtlError, Result};

/// CLI arguments for the agricultural survey processor
#[derive(Debug, Clone, Parser)]
#[command(
    name = "agrisurvey-processor",
    version,
    about = "Clean agricultural field survey data and aggregate weather station readings",
    long_about = "Ingests field survey records from a SQLite database and weather sensor \
                  messages from a remote CSV, repairs known data-quality defects (swapped \
                  columns, sign-flipped elevations, misspelled crop types), extracts typed \
                  measurements from free-text sensor messages, and reports mean values per \
                  weather station."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a TOML configuration file
    ///
    /// When omitted, `agrisurvey.toml` in the working directory is used if
    /// present, and built-in defaults otherwise.
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    /// Directory for Parquet output files
    ///
    /// Nothing is written when omitted; results are only reported.
    #[arg(short = 'o', long = "output", value_name = "PATH", global = true)]
    pub output_path: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        global = true
    )]
    pub log_level: String,

    /// Suppress the summary report
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Clean the field survey table and merge the station mapping
    Fields,
    /// Extract measurements from station messages and average them per station
    Weather,
    /// Run both pipelines
    Run,
}

impl Args {
    /// Validate argument combinations before running.
    pub fn validate(&self) -> Result<()> {
        const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(EtlError::configuration(format!(
                "unknown log level '{}', expected one of {}",
                self.log_level,
                LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    pub fn get_log_level(&self) -> String {
        self.log_level.to_lowercase()
    }
}
