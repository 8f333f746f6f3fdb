//! Per-station aggregation of extracted measurements.

use polars::prelude::pivot::pivot_stable;
use polars::prelude::*;

use crate::constants::{MEASUREMENT_COLUMN, VALUE_COLUMN};
use crate::error::{EtlError, Result};

/// Mean `Value` per (station, measurement kind), pivoted so each kind
/// becomes a column and each station a row.
///
/// Pairs with no observations are absent rather than zero. Calling this
/// before the derived measurement columns exist is reported as misuse,
/// distinct from the legitimate all-miss case which yields an empty
/// table.
pub fn station_means(df: &DataFrame, station_column: &str) -> Result<DataFrame> {
    for required in [MEASUREMENT_COLUMN, VALUE_COLUMN] {
        if df.get_column_index(required).is_none() {
            return Err(EtlError::MeasurementsNotExtracted);
        }
    }
    if df.get_column_index(station_column).is_none() {
        return Err(EtlError::missing_column(station_column, "station aggregation"));
    }

    let means = df
        .clone()
        .lazy()
        .filter(col(MEASUREMENT_COLUMN).is_not_null())
        .group_by([col(station_column), col(MEASUREMENT_COLUMN)])
        .agg([col(VALUE_COLUMN).mean()])
        .sort_by_exprs(
            [col(station_column), col(MEASUREMENT_COLUMN)],
            SortMultipleOptions::default(),
        )
        .collect()?;

    if means.height() == 0 {
        // every message was a miss: an empty table, not an error
        let station_dtype = df.column(station_column)?.dtype().clone();
        let empty = Series::new_empty(station_column.into(), &station_dtype);
        return Ok(DataFrame::new(vec![empty.into_column()])?);
    }

    let wide = pivot_stable(
        &means,
        [MEASUREMENT_COLUMN],
        Some([station_column]),
        Some([VALUE_COLUMN]),
        true,
        None,
        None,
    )?;

    Ok(wide)
}
