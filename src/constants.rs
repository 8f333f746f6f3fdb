//! Application constants for the survey processor
//!
//! Fixed column names of the survey and weather datasets, plus default
//! file names used by the CLI. Everything deployment-specific (URLs,
//! queries, pattern tables) lives in configuration instead.

// =============================================================================
// Fixed dataset columns
// =============================================================================

/// Join key shared by the field survey and the station mapping table
pub const FIELD_ID_COLUMN: &str = "Field_ID";

/// Free-text sensor message column in the weather dataset
pub const MESSAGE_COLUMN: &str = "Message";

/// Station identifier column in the weather dataset
pub const STATION_COLUMN: &str = "Weather_station_ID";

/// Derived column holding the extracted measurement kind
pub const MEASUREMENT_COLUMN: &str = "Measurement";

/// Derived column holding the extracted numeric value
pub const VALUE_COLUMN: &str = "Value";

// =============================================================================
// Column repair
// =============================================================================

/// Seed for the transient label used during the column swap rotation.
/// Extended with underscores until it collides with no real column.
pub const SWAP_PLACEHOLDER_SEED: &str = "__swap_placeholder__";

// =============================================================================
// CLI defaults
// =============================================================================

/// Default configuration file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "agrisurvey.toml";

/// Output file name for the cleaned field survey table
pub const FIELD_OUTPUT_FILE: &str = "field_data.parquet";

/// Output file name for the per-station measurement means
pub const MEANS_OUTPUT_FILE: &str = "station_means.parquet";
