//! Weather pipeline: remote station messages -> typed measurements ->
//! per-station means.

pub mod aggregator;
pub mod extractor;
pub mod patterns;

use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::constants::{MEASUREMENT_COLUMN, MESSAGE_COLUMN, STATION_COLUMN, VALUE_COLUMN};
use crate::error::{EtlError, Result};
use crate::ingest::RemoteCsvClient;
use crate::models::WeatherStats;

use self::extractor::extract_measurement;
use self::patterns::PatternTable;

/// Processor for the weather station message feed.
///
/// Stages run in order: [`load`](Self::load), then
/// [`process_messages`](Self::process_messages), after which
/// [`station_means`](Self::station_means) may be called any number of
/// times. [`process`](Self::process) runs the full sequence.
#[derive(Debug)]
pub struct WeatherDataProcessor {
    url: String,
    patterns: PatternTable,
    client: RemoteCsvClient,
    df: Option<DataFrame>,
}

impl WeatherDataProcessor {
    /// Build a processor from configuration, compiling the pattern table.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            url: config.weather.url.clone(),
            patterns: PatternTable::compile(&config.weather.patterns)?,
            client: RemoteCsvClient::new(),
            df: None,
        })
    }

    /// Fetch the raw station messages from the remote source.
    pub async fn load(&mut self) -> Result<()> {
        let df = self.client.fetch_dataframe(&self.url).await?;
        info!(rows = df.height(), "loaded weather station data");
        self.df = Some(df);
        Ok(())
    }

    /// Run the extractor over every message, appending nullable
    /// `Measurement` and `Value` columns. Records that match no pattern
    /// are retained with null fields.
    ///
    /// Returns (matched, missed) counts.
    pub fn process_messages(&mut self) -> Result<(usize, usize)> {
        let (kinds, values, extracted) = {
            let df = self
                .df
                .as_ref()
                .ok_or_else(|| EtlError::data_not_loaded("process_messages"))?;
            let messages = df
                .column(MESSAGE_COLUMN)
                .map_err(|_| EtlError::missing_column(MESSAGE_COLUMN, "message processing"))?
                .str()?;

            let mut kinds: Vec<Option<String>> = Vec::with_capacity(messages.len());
            let mut values: Vec<Option<f64>> = Vec::with_capacity(messages.len());
            let mut extracted = 0usize;

            for message in messages.iter() {
                let measurement = match message {
                    Some(text) => extract_measurement(&self.patterns, text)?,
                    None => None,
                };
                match measurement {
                    Some(m) => {
                        extracted += 1;
                        kinds.push(Some(m.kind));
                        values.push(Some(m.value));
                    }
                    None => {
                        kinds.push(None);
                        values.push(None);
                    }
                }
            }

            (kinds, values, extracted)
        };

        let df = self.df.as_mut().expect("frame checked above");
        let misses = df.height() - extracted;
        df.with_column(Series::new(MEASUREMENT_COLUMN.into(), kinds))?;
        df.with_column(Series::new(VALUE_COLUMN.into(), values))?;

        info!(extracted, misses, "messages processed and measurements extracted");
        Ok((extracted, misses))
    }

    /// Aggregate mean values per (station, measurement kind).
    pub fn station_means(&self) -> Result<DataFrame> {
        let df = self
            .df
            .as_ref()
            .ok_or_else(|| EtlError::data_not_loaded("station_means"))?;
        debug!("calculating station means");
        aggregator::station_means(df, STATION_COLUMN)
    }

    /// Run the full weather pipeline: load, then extract.
    pub async fn process(&mut self) -> Result<WeatherStats> {
        let started = Instant::now();

        self.load().await?;
        let (extracted, misses) = self.process_messages()?;

        let stats = WeatherStats {
            messages_ingested: self.df.as_ref().map(DataFrame::height).unwrap_or(0),
            measurements_extracted: extracted,
            extraction_misses: misses,
            processing_time_ms: started.elapsed().as_millis(),
        };
        info!("weather data processing completed");
        Ok(stats)
    }

    /// The processed frame, once loaded.
    pub fn data(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const WEATHER_CSV: &str = "\
Weather_station_ID,Message
A,temp: 23.4C
A,temp: 24.6C
B,rainfall of 8mm recorded
B,sensor offline
";

    async fn processor_for(server_url: &str) -> WeatherDataProcessor {
        let mut config = PipelineConfig::default()
            .with_weather_url(format!("{}/weather.csv", server_url));
        config.weather.patterns = vec![
            crate::config::MeasurementPattern {
                kind: "Temperature".to_string(),
                pattern: r"(\d+(\.\d+)?)\s?C".to_string(),
            },
            crate::config::MeasurementPattern {
                kind: "Rainfall".to_string(),
                pattern: r"(\d+(\.\d+)?)\s?mm".to_string(),
            },
        ];
        WeatherDataProcessor::new(&config).unwrap()
    }

    #[tokio::test]
    async fn batch_processing_retains_miss_rows_with_nulls() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/weather.csv")
            .with_status(200)
            .with_body(WEATHER_CSV)
            .create_async()
            .await;

        let mut processor = processor_for(&server.url()).await;
        let stats = processor.process().await.unwrap();

        assert_eq!(stats.messages_ingested, 4);
        assert_eq!(stats.measurements_extracted, 3);
        assert_eq!(stats.extraction_misses, 1);

        let df = processor.data().unwrap();
        // the miss row is retained, with null derived fields
        assert_eq!(df.height(), 4);
        let kinds = df.column(MEASUREMENT_COLUMN).unwrap().str().unwrap();
        assert_eq!(kinds.get(3), None);
        let values = df.column(VALUE_COLUMN).unwrap().f64().unwrap();
        assert_eq!(values.get(3), None);
        assert_eq!(values.get(0), Some(23.4));
    }

    #[tokio::test]
    async fn station_means_before_extraction_is_misuse() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/weather.csv")
            .with_status(200)
            .with_body(WEATHER_CSV)
            .create_async()
            .await;

        let mut processor = processor_for(&server.url()).await;
        processor.load().await.unwrap();

        let result = processor.station_means();
        assert!(matches!(result, Err(EtlError::MeasurementsNotExtracted)));
    }

    #[tokio::test]
    async fn station_means_before_load_reports_no_data() {
        let processor = processor_for("http://unused.invalid").await;
        let result = processor.station_means();
        assert!(matches!(result, Err(EtlError::DataNotLoaded { .. })));
    }

    #[tokio::test]
    async fn processing_before_load_reports_no_data() {
        let mut processor = processor_for("http://unused.invalid").await;
        let result = processor.process_messages();
        assert!(matches!(result, Err(EtlError::DataNotLoaded { .. })));
    }
}
