//! End-to-end weather pipeline tests against a mocked remote source.

use agrisurvey_processor::config::{MeasurementPattern, PipelineConfig};
use agrisurvey_processor::constants::{MEASUREMENT_COLUMN, VALUE_COLUMN};
use agrisurvey_processor::{EtlError, WeatherDataProcessor};
use mockito::Server;
use pretty_assertions::assert_eq;

fn pipeline_config(weather_url: String) -> PipelineConfig {
    let mut config = PipelineConfig::default().with_weather_url(weather_url);
    config.weather.patterns = vec![
        MeasurementPattern {
            kind: "temperature".to_string(),
            pattern: r"(\d+(\.\d+)?)\s?C".to_string(),
        },
        MeasurementPattern {
            kind: "humidity".to_string(),
            pattern: r"(\d+(\.\d+)?)\s?%".to_string(),
        },
    ];
    config
}

const WEATHER_CSV: &str = "\
Weather_station_ID,Message
A,temp: 23.4C
A,temp: 24.6C
A,rainfall heavy
B,humidity at 56%
B,humidity at 58%
";

#[tokio::test]
async fn extracts_and_averages_measurements_per_station() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/weather.csv")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body(WEATHER_CSV)
        .create_async()
        .await;

    let config = pipeline_config(format!("{}/weather.csv", server.url()));
    let mut processor = WeatherDataProcessor::new(&config).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.messages_ingested, 5);
    assert_eq!(stats.measurements_extracted, 4);
    assert_eq!(stats.extraction_misses, 1);

    // the miss is retained with null derived fields
    let df = processor.data().unwrap();
    assert_eq!(df.height(), 5);
    let kinds = df.column(MEASUREMENT_COLUMN).unwrap().str().unwrap();
    assert_eq!(kinds.get(0), Some("temperature"));
    assert_eq!(kinds.get(2), None);
    let values = df.column(VALUE_COLUMN).unwrap().f64().unwrap();
    assert_eq!(values.get(2), None);

    // station A temperature observations 23.4 and 24.6 average to 24.0
    let means = processor.station_means().unwrap();
    assert_eq!(means.height(), 2);

    let stations = means.column("Weather_station_ID").unwrap().str().unwrap();
    assert_eq!(stations.get(0), Some("A"));
    assert_eq!(stations.get(1), Some("B"));

    let temperature = means.column("temperature").unwrap().f64().unwrap();
    assert_eq!(temperature.get(0), Some(24.0));
    // station B never reported temperature: absent, not zero
    assert_eq!(temperature.get(1), None);

    let humidity = means.column("humidity").unwrap().f64().unwrap();
    assert_eq!(humidity.get(0), None);
    assert_eq!(humidity.get(1), Some(57.0));

    mock.assert_async().await;
}

#[tokio::test]
async fn all_miss_feed_yields_an_empty_aggregate() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/weather.csv")
        .with_status(200)
        .with_body("Weather_station_ID,Message\nA,dust storm\nB,sensor rebooted\n")
        .create_async()
        .await;

    let config = pipeline_config(format!("{}/weather.csv", server.url()));
    let mut processor = WeatherDataProcessor::new(&config).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.measurements_extracted, 0);
    assert_eq!(stats.extraction_misses, 2);

    let means = processor.station_means().unwrap();
    assert_eq!(means.height(), 0);
}

#[tokio::test]
async fn fetch_failure_fails_the_whole_run() {
    let config = pipeline_config("http://127.0.0.1:1/weather.csv".to_string());
    let mut processor = WeatherDataProcessor::new(&config).unwrap();

    let result = processor.process().await;
    assert!(matches!(result, Err(EtlError::FetchFailed { .. })));
    assert!(processor.data().is_none());
}

#[tokio::test]
async fn numeric_mismatch_between_pattern_and_data_is_fatal() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/weather.csv")
        .with_status(200)
        .with_body("Weather_station_ID,Message\nA,wind strong\n")
        .create_async()
        .await;

    let mut config = pipeline_config(format!("{}/weather.csv", server.url()));
    config.weather.patterns = vec![MeasurementPattern {
        kind: "wind".to_string(),
        pattern: r"wind (\w+)".to_string(),
    }];

    let mut processor = WeatherDataProcessor::new(&config).unwrap();
    let result = processor.process().await;

    assert!(matches!(result, Err(EtlError::NumericCapture { .. })));
}
