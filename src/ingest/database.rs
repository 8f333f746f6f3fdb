//! Tabular data source: connection descriptor + query -> DataFrame.
//!
//! The pool lives only for the duration of the ingestion call and is
//! closed on every exit path. Column decoding follows the declared SQLite
//! type; the column set is fixed by the query, nothing is inferred.

use polars::prelude::*;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row, TypeInfo};
use tracing::{debug, info};

use crate::error::{EtlError, Result};

/// Execute `query` against the database named by `descriptor` and return
/// the full result set as a DataFrame.
///
/// Zero rows is reported as [`EtlError::EmptyQueryResult`], distinct from
/// connection and query failures.
pub async fn query_to_dataframe(descriptor: &str, query: &str) -> Result<DataFrame> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(descriptor)
        .await
        .map_err(|source| EtlError::DatabaseConnection {
            descriptor: descriptor.to_string(),
            source,
        })?;

    let fetched = sqlx::query(query).fetch_all(&pool).await;

    // The pool is scoped to this call, success or not.
    pool.close().await;

    let rows = fetched.map_err(|source| EtlError::QueryFailed {
        descriptor: descriptor.to_string(),
        source,
    })?;

    if rows.is_empty() {
        return Err(EtlError::EmptyQueryResult {
            descriptor: descriptor.to_string(),
        });
    }

    let df = rows_to_dataframe(&rows, descriptor)?;
    info!(
        rows = df.height(),
        columns = df.width(),
        "loaded result set from data source"
    );
    Ok(df)
}

fn rows_to_dataframe(rows: &[SqliteRow], descriptor: &str) -> Result<DataFrame> {
    let layout = rows[0].columns();
    let mut columns: Vec<Column> = Vec::with_capacity(layout.len());

    for (idx, column) in layout.iter().enumerate() {
        let name = column.name();
        let type_name = column.type_info().name().to_uppercase();
        debug!(column = name, declared = %type_name, "decoding column");

        let series = if type_name.contains("INT") || type_name.contains("BOOL") {
            let values = decode_column::<i64>(rows, idx, descriptor)?;
            Series::new(name.into(), values)
        } else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
            .iter()
            .any(|t| type_name.contains(t))
        {
            let values = decode_column::<f64>(rows, idx, descriptor)?;
            Series::new(name.into(), values)
        } else if type_name.contains("BLOB") {
            return Err(EtlError::UnsupportedColumnType {
                column: name.to_string(),
                type_name,
            });
        } else if type_name == "NULL" {
            // expression column with no declared type and no values
            Series::full_null(name.into(), rows.len(), &DataType::String)
        } else {
            let values = decode_column::<String>(rows, idx, descriptor)?;
            Series::new(name.into(), values)
        };

        columns.push(series.into_column());
    }

    Ok(DataFrame::new(columns)?)
}

fn decode_column<'r, T>(rows: &'r [SqliteRow], idx: usize, descriptor: &str) -> Result<Vec<Option<T>>>
where
    Option<T>: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    rows.iter()
        .map(|row| {
            row.try_get::<Option<T>, _>(idx)
                .map_err(|source| EtlError::QueryFailed {
                    descriptor: descriptor.to_string(),
                    source,
                })
        })
        .collect()
}
