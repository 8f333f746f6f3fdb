//! Remote delimited file source: URL -> DataFrame.
//!
//! Downloads the file with reqwest and parses it with the polars CSV
//! reader inside a blocking task. Fetch failures (network, HTTP status)
//! are distinct from empty or unparseable files.

use std::io::Write;

use polars::prelude::*;
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::task;
use tracing::{debug, info};

use crate::error::{EtlError, Result};

/// HTTP client for delimited text sources
#[derive(Debug, Clone, Default)]
pub struct RemoteCsvClient {
    client: Client,
}

impl RemoteCsvClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Fetch `url` and parse the body as headered CSV.
    pub async fn fetch_dataframe(&self, url: &str) -> Result<DataFrame> {
        debug!(url, "fetching remote delimited file");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| EtlError::FetchFailed {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| EtlError::FetchFailed {
                url: url.to_string(),
                source,
            })?;

        if bytes.is_empty() {
            return Err(EtlError::EmptyRemoteFile {
                url: url.to_string(),
            });
        }

        let df = csv_to_dataframe(bytes.to_vec(), url.to_string()).await?;
        if df.height() == 0 {
            return Err(EtlError::EmptyRemoteFile {
                url: url.to_string(),
            });
        }

        info!(
            url,
            rows = df.height(),
            columns = df.width(),
            "loaded remote delimited file"
        );
        Ok(df)
    }
}

/// Parse raw CSV bytes in a blocking task, via a temp file the polars
/// reader can own.
async fn csv_to_dataframe(bytes: Vec<u8>, url: String) -> Result<DataFrame> {
    task::spawn_blocking(move || {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(&bytes)?;
        temp_file.flush()?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
            .map_err(|source| EtlError::InvalidRemoteFile {
                url: url.clone(),
                source,
            })?
            .finish()
            .map_err(|source| EtlError::InvalidRemoteFile { url, source })?;

        Ok(df)
    })
    .await?
}
