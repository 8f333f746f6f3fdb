//! Configuration management for both pipelines.
//!
//! Provides serde-backed configuration structures with complete defaults
//! for the data sources, the column repairs, and the measurement pattern
//! table. Values are layered from an optional TOML file over the defaults;
//! the pipelines themselves never hardcode any of these.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONFIG_FILE;
use crate::error::{EtlError, Result};

/// Top-level configuration for a pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub database: DatabaseConfig,
    pub field: FieldConfig,
    pub weather: WeatherConfig,
}

/// Tabular data source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection descriptor, e.g. `sqlite:farm_survey.db`
    pub descriptor: String,

    /// Query producing the joined field survey row set
    pub query: String,
}

/// Field pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// The two mutually mislabeled columns to exchange
    pub swapped_columns: (String, String),

    /// Categorical column subject to alias normalization
    pub category_column: String,

    /// Known-bad category labels and their canonical forms. Lookup is
    /// exact: whitespace variants need their own entries.
    pub aliases: HashMap<String, String>,

    /// Numeric column forced non-negative (sign-flip repair, not validation)
    pub absolute_column: String,

    /// URL of the field-to-station mapping CSV
    pub mapping_url: String,

    /// Export-artifact columns dropped after the merge when present
    pub drop_columns: Vec<String>,
}

/// Weather pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// URL of the raw station message CSV
    pub url: String,

    /// Measurement patterns, tried in order; the first match wins, so
    /// precedence between ambiguous messages is fixed by this list.
    pub patterns: Vec<MeasurementPattern>,
}

/// One entry of the pattern table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPattern {
    /// Measurement kind label, e.g. "Temperature"
    pub kind: String,

    /// Regex with at least one capturing group holding a numeric literal
    pub pattern: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            descriptor: "sqlite:maji_ndogo_farm_survey.db".to_string(),
            query: "\
SELECT *
FROM geographic_features
LEFT JOIN weather_features USING (Field_ID)
LEFT JOIN soil_and_crop_features USING (Field_ID)
LEFT JOIN farm_management_features USING (Field_ID)"
                .to_string(),
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        let aliases = [
            ("cassaval", "cassava"),
            ("wheatn", "wheat"),
            ("teaa", "tea"),
            ("cassava ", "cassava"),
            ("wheat ", "wheat"),
            ("tea ", "tea"),
        ]
        .into_iter()
        .map(|(bad, good)| (bad.to_string(), good.to_string()))
        .collect();

        Self {
            swapped_columns: ("Annual_yield".to_string(), "Crop_type".to_string()),
            category_column: "Crop_type".to_string(),
            aliases,
            absolute_column: "Elevation".to_string(),
            mapping_url:
                "https://raw.githubusercontent.com/Explore-AI/Public-Data/master/Maji_Ndogo/Weather_data_field_mapping.csv"
                    .to_string(),
            drop_columns: vec!["Unnamed: 0".to_string()],
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            url:
                "https://raw.githubusercontent.com/Explore-AI/Public-Data/master/Maji_Ndogo/Weather_station_data.csv"
                    .to_string(),
            patterns: vec![
                MeasurementPattern {
                    kind: "Rainfall".to_string(),
                    pattern: r"(\d+(\.\d+)?)\s?mm".to_string(),
                },
                MeasurementPattern {
                    kind: "Temperature".to_string(),
                    pattern: r"(\d+(\.\d+)?)\s?C".to_string(),
                },
                MeasurementPattern {
                    kind: "Pollution_level".to_string(),
                    pattern: r"=\s*(-?\d+(\.\d+)?)|Pollution at \s*(-?\d+(\.\d+)?)".to_string(),
                },
            ],
        }
    }
}

impl PipelineConfig {
    /// Load configuration from an explicit file, the default file if one
    /// exists in the working directory, or built-in defaults otherwise.
    ///
    /// An explicitly named file that is missing or malformed is an error;
    /// a missing default file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(EtlError::configuration(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize::<PipelineConfig>()?)
    }

    /// Override the weather CSV URL
    pub fn with_weather_url(mut self, url: impl Into<String>) -> Self {
        self.weather.url = url.into();
        self
    }

    /// Override the station mapping URL
    pub fn with_mapping_url(mut self, url: impl Into<String>) -> Self {
        self.field.mapping_url = url.into();
        self
    }

    /// Override the database connection descriptor
    pub fn with_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.database.descriptor = descriptor.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_cover_both_pipelines() {
        let config = PipelineConfig::default();

        assert!(config.database.descriptor.starts_with("sqlite:"));
        assert!(config.database.query.contains("Field_ID"));
        assert_eq!(
            config.field.swapped_columns,
            ("Annual_yield".to_string(), "Crop_type".to_string())
        );
        assert_eq!(config.field.aliases.get("cassaval").unwrap(), "cassava");
        assert_eq!(config.weather.patterns[0].kind, "Rainfall");
        assert_eq!(config.weather.patterns.len(), 3);
    }

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let config = PipelineConfig::load(None).unwrap();
        assert_eq!(config.field.absolute_column, "Elevation");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = PipelineConfig::load(Some(Path::new("/nonexistent/agrisurvey.toml")));
        assert!(matches!(
            result,
            Err(EtlError::Configuration { .. })
        ));
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[database]
descriptor = "sqlite:other.db"

[weather]
url = "http://localhost/weather.csv"

[[weather.patterns]]
kind = "Humidity"
pattern = '(\d+(\.\d+)?)\s?%'
"#
        )
        .unwrap();

        let config = PipelineConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.database.descriptor, "sqlite:other.db");
        // untouched sections keep their defaults
        assert!(config.database.query.contains("geographic_features"));
        assert_eq!(config.weather.url, "http://localhost/weather.csv");
        // a supplied pattern table replaces the default one wholesale
        assert_eq!(config.weather.patterns.len(), 1);
        assert_eq!(config.weather.patterns[0].kind, "Humidity");
    }
}
