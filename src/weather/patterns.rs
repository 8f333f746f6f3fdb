//! Compiled measurement pattern table.
//!
//! Pattern order is part of the extraction contract: entries are tried in
//! the order configured and the first match wins, so precedence between
//! ambiguous messages is fixed here rather than by any scoring.

use regex::Regex;

use crate::config::MeasurementPattern;
use crate::error::{EtlError, Result};

/// One compiled pattern and the measurement kind it recognizes
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pub kind: String,
    pub regex: Regex,
}

/// Ordered table of measurement patterns
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

impl PatternTable {
    /// Compile the configured patterns, preserving their order.
    pub fn compile(patterns: &[MeasurementPattern]) -> Result<Self> {
        let entries = patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|regex| PatternEntry {
                        kind: p.kind.clone(),
                        regex,
                    })
                    .map_err(|source| EtlError::InvalidPattern {
                        kind: p.kind.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
