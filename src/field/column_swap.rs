//! Repair for a mutually swapped pair of column labels.
//!
//! The source dataset ships with two columns whose labels are exchanged;
//! the values under each label must end up under the other. The exchange
//! is a three-way label rotation through a transient placeholder that is
//! extended until it collides with nothing. Renames run against a clone,
//! so the caller's frame is untouched unless every step succeeds.

use polars::prelude::*;
use tracing::debug;

use crate::constants::SWAP_PLACEHOLDER_SEED;
use crate::error::{EtlError, Result};

/// Exchange the contents of `left` and `right`.
pub fn swap_columns(df: &DataFrame, left: &str, right: &str) -> Result<DataFrame> {
    for column in [left, right] {
        if df.get_column_index(column).is_none() {
            return Err(EtlError::missing_column(column, "column repair"));
        }
    }

    if left == right {
        return Ok(df.clone());
    }

    let mut placeholder = SWAP_PLACEHOLDER_SEED.to_string();
    while df.get_column_index(&placeholder).is_some() {
        placeholder.push('_');
    }
    debug!(left, right, placeholder = %placeholder, "rotating column labels");

    let mut repaired = df.clone();
    repaired.rename(left, placeholder.as_str().into())?;
    // `rename` caches the schema on first use and does not invalidate it after
    // mutating columns, so the cached name set must be cleared between renames
    // or the next rename sees the stale pre-rename labels.
    repaired.clear_schema();
    repaired.rename(right, left.into())?;
    repaired.clear_schema();
    repaired.rename(&placeholder, right.into())?;
    // Drop the stale cached schema so the returned frame (and any clone of it)
    // reflects the final labels rather than the transient placeholder.
    repaired.clear_schema();

    Ok(repaired)
}
