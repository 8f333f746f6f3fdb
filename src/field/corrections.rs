//! Value-level repairs for known data-quality defects.
//!
//! Two corrections ship with the survey: categorical labels with known
//! misspellings, and an elevation column recorded with flipped signs.
//! Both silently correct; neither rejects.

use std::collections::HashMap;

use polars::prelude::*;
use tracing::debug;

use crate::error::{EtlError, Result};

/// Replace every value found in the alias table with its canonical form.
///
/// Lookup is exact, and values absent from the table pass through
/// unchanged; whitespace variants are corrected only when the table
/// carries an entry for them. Returns the repaired frame and the number
/// of rewritten values.
pub fn normalize_categories(
    df: &DataFrame,
    column: &str,
    aliases: &HashMap<String, String>,
) -> Result<(DataFrame, usize)> {
    if df.get_column_index(column).is_none() {
        return Err(EtlError::missing_column(column, "alias normalization"));
    }

    let ca = df.column(column)?.str()?;
    let mut replaced = 0usize;
    let normalized: StringChunked = ca
        .iter()
        .map(|opt| {
            opt.map(|value| match aliases.get(value) {
                Some(canonical) => {
                    replaced += 1;
                    canonical.as_str()
                }
                None => value,
            })
        })
        .collect();

    let mut series = normalized.into_series();
    series.rename(column.into());

    let mut repaired = df.clone();
    repaired.with_column(series)?;
    debug!(column, replaced, "normalized categorical values");
    Ok((repaired, replaced))
}

/// Replace every value of a numeric column with its absolute value.
///
/// This is a domain repair for a known sign-flip bug, not validation:
/// negative inputs are corrected, never rejected.
pub fn absolute_values(df: &DataFrame, column: &str) -> Result<DataFrame> {
    if df.get_column_index(column).is_none() {
        return Err(EtlError::missing_column(column, "sign repair"));
    }

    let repaired = df.clone().lazy().with_column(col(column).abs()).collect()?;
    Ok(repaired)
}
