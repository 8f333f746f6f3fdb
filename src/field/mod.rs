//! Field pipeline: survey rows from the relational source, repaired and
//! merged with the station mapping.

pub mod column_swap;
pub mod corrections;

use std::time::Instant;

use polars::prelude::*;
use tracing::info;

use crate::config::{FieldConfig, PipelineConfig};
use crate::constants::FIELD_ID_COLUMN;
use crate::error::{EtlError, Result};
use crate::ingest::{query_to_dataframe, RemoteCsvClient};
use crate::models::FieldStats;

/// Processor for the field survey table.
///
/// Stages run in order: [`ingest`](Self::ingest),
/// [`repair_columns`](Self::repair_columns),
/// [`apply_corrections`](Self::apply_corrections),
/// [`merge_station_mapping`](Self::merge_station_mapping),
/// [`drop_extraneous_columns`](Self::drop_extraneous_columns).
/// [`process`](Self::process) runs the full sequence.
#[derive(Debug)]
pub struct FieldDataProcessor {
    descriptor: String,
    query: String,
    config: FieldConfig,
    client: RemoteCsvClient,
    df: Option<DataFrame>,
    values_normalized: usize,
}

impl FieldDataProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            descriptor: config.database.descriptor.clone(),
            query: config.database.query.clone(),
            config: config.field.clone(),
            client: RemoteCsvClient::new(),
            df: None,
            values_normalized: 0,
        }
    }

    /// Load the survey rows from the relational source. The connection is
    /// scoped to this call.
    pub async fn ingest(&mut self) -> Result<()> {
        let df = query_to_dataframe(&self.descriptor, &self.query).await?;
        info!(rows = df.height(), "loaded field survey data");
        self.df = Some(df);
        Ok(())
    }

    /// Exchange the contents of the two mislabeled columns.
    pub fn repair_columns(&mut self) -> Result<()> {
        let df = self
            .df
            .as_ref()
            .ok_or_else(|| EtlError::data_not_loaded("repair_columns"))?;
        let (left, right) = (
            self.config.swapped_columns.0.as_str(),
            self.config.swapped_columns.1.as_str(),
        );

        let repaired = column_swap::swap_columns(df, left, right)?;
        self.df = Some(repaired);
        info!(left, right, "swapped mislabeled columns");
        Ok(())
    }

    /// Force the elevation column non-negative and normalize categorical
    /// aliases.
    pub fn apply_corrections(&mut self) -> Result<()> {
        let df = self
            .df
            .as_ref()
            .ok_or_else(|| EtlError::data_not_loaded("apply_corrections"))?;

        let corrected = corrections::absolute_values(df, &self.config.absolute_column)?;
        let (corrected, replaced) = corrections::normalize_categories(
            &corrected,
            &self.config.category_column,
            &self.config.aliases,
        )?;

        self.values_normalized = replaced;
        self.df = Some(corrected);
        info!(
            absolute = %self.config.absolute_column,
            category = %self.config.category_column,
            replaced,
            "applied corrections"
        );
        Ok(())
    }

    /// Left-join the externally fetched station mapping on the field
    /// identifier. Every survey row is preserved; unmatched rows carry
    /// nulls, duplicate mapping keys fan out.
    pub async fn merge_station_mapping(&mut self) -> Result<()> {
        let df = self
            .df
            .as_ref()
            .ok_or_else(|| EtlError::data_not_loaded("merge_station_mapping"))?;

        let mapping = self.client.fetch_dataframe(&self.config.mapping_url).await?;
        for (frame, name) in [(df, "survey"), (&mapping, "mapping")] {
            if frame.get_column_index(FIELD_ID_COLUMN).is_none() {
                return Err(EtlError::missing_column(
                    FIELD_ID_COLUMN,
                    format!("station mapping merge ({name} side)"),
                ));
            }
        }

        let joined = df
            .clone()
            .lazy()
            .join(
                mapping.lazy(),
                [col(FIELD_ID_COLUMN)],
                [col(FIELD_ID_COLUMN)],
                JoinArgs::new(JoinType::Left),
            )
            .collect()?;

        info!(rows = joined.height(), "merged station mapping");
        self.df = Some(joined);
        Ok(())
    }

    /// Drop export-artifact columns when present; absence is fine.
    pub fn drop_extraneous_columns(&mut self) -> Result<()> {
        let df = self
            .df
            .as_ref()
            .ok_or_else(|| EtlError::data_not_loaded("drop_extraneous_columns"))?;

        let trimmed = df.drop_many(self.config.drop_columns.iter().map(String::as_str));
        self.df = Some(trimmed);
        Ok(())
    }

    /// Run the full field pipeline.
    pub async fn process(&mut self) -> Result<FieldStats> {
        let started = Instant::now();

        self.ingest().await?;
        let rows_ingested = self.df.as_ref().map(DataFrame::height).unwrap_or(0);

        self.repair_columns()?;
        self.apply_corrections()?;
        self.merge_station_mapping().await?;
        self.drop_extraneous_columns()?;

        let stats = FieldStats {
            rows_ingested,
            rows_merged: self.df.as_ref().map(DataFrame::height).unwrap_or(0),
            values_normalized: self.values_normalized,
            processing_time_ms: started.elapsed().as_millis(),
        };
        info!("field data processing completed");
        Ok(stats)
    }

    /// The processed frame, once ingested.
    pub fn data(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }
}
