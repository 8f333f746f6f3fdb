//! Measurement extraction from free-text sensor messages.

use tracing::trace;

use crate::error::{EtlError, Result};
use crate::models::Measurement;
use crate::weather::patterns::PatternTable;

/// Try the pattern table against `message` in order and return the first
/// match as a typed measurement.
///
/// `Ok(None)` is the normal outcome for free-form messages that match no
/// pattern. A pattern that matches but whose capture is not numeric (or
/// that populated no capture group at all) is a configuration/data
/// mismatch and fails hard.
pub fn extract_measurement(patterns: &PatternTable, message: &str) -> Result<Option<Measurement>> {
    for entry in patterns.iter() {
        let Some(captures) = entry.regex.captures(message) else {
            continue;
        };

        // Alternation patterns populate different groups per branch; the
        // first participating group carries the value.
        let capture = captures
            .iter()
            .skip(1)
            .flatten()
            .next()
            .ok_or_else(|| EtlError::EmptyCapture {
                kind: entry.kind.clone(),
                message: message.to_string(),
            })?;

        let value: f64 =
            capture
                .as_str()
                .parse()
                .map_err(|source| EtlError::NumericCapture {
                    kind: entry.kind.clone(),
                    capture: capture.as_str().to_string(),
                    source,
                })?;

        trace!(kind = %entry.kind, value, "measurement extracted");
        return Ok(Some(Measurement {
            kind: entry.kind.clone(),
            value,
        }));
    }

    trace!("no measurement match found");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeasurementPattern;

    fn table(entries: &[(&str, &str)]) -> PatternTable {
        let patterns: Vec<_> = entries
            .iter()
            .map(|(kind, pattern)| MeasurementPattern {
                kind: kind.to_string(),
                pattern: pattern.to_string(),
            })
            .collect();
        PatternTable::compile(&patterns).unwrap()
    }

    #[test]
    fn extracts_kind_and_value() {
        let table = table(&[
            ("Temperature", r"(\d+(\.\d+)?)\s?C"),
            ("Humidity", r"(\d+(\.\d+)?)\s?%"),
        ]);

        let result = extract_measurement(&table, "temp: 23.4C").unwrap().unwrap();
        assert_eq!(result.kind, "Temperature");
        assert_eq!(result.value, 23.4);

        let result = extract_measurement(&table, "humidity at 56%")
            .unwrap()
            .unwrap();
        assert_eq!(result.kind, "Humidity");
        assert_eq!(result.value, 56.0);
    }

    #[test]
    fn no_match_is_a_normal_miss() {
        let table = table(&[("Temperature", r"(\d+(\.\d+)?)\s?C")]);
        assert_eq!(extract_measurement(&table, "rainfall heavy").unwrap(), None);
    }

    #[test]
    fn empty_table_never_matches() {
        let table = table(&[]);
        assert_eq!(extract_measurement(&table, "temp: 23.4C").unwrap(), None);
    }

    #[test]
    fn first_matching_pattern_wins() {
        // Both patterns match "23.4C at 56%"; table order decides.
        let table = table(&[
            ("Humidity", r"(\d+(\.\d+)?)\s?%"),
            ("Temperature", r"(\d+(\.\d+)?)\s?C"),
        ]);

        let result = extract_measurement(&table, "23.4C at 56%").unwrap().unwrap();
        assert_eq!(result.kind, "Humidity");
        assert_eq!(result.value, 56.0);
    }

    #[test]
    fn alternation_uses_first_populated_group() {
        let table = table(&[(
            "Pollution_level",
            r"=\s*(-?\d+(\.\d+)?)|Pollution at \s*(-?\d+(\.\d+)?)",
        )]);

        let result = extract_measurement(&table, "Pollution at 12.5")
            .unwrap()
            .unwrap();
        assert_eq!(result.kind, "Pollution_level");
        assert_eq!(result.value, 12.5);

        let result = extract_measurement(&table, "level = -3.25").unwrap().unwrap();
        assert_eq!(result.value, -3.25);
    }

    #[test]
    fn non_numeric_capture_fails_hard() {
        let table = table(&[("Wind", r"wind (\w+)")]);

        let result = extract_measurement(&table, "wind strong");
        match result {
            Err(EtlError::NumericCapture { kind, capture, .. }) => {
                assert_eq!(kind, "Wind");
                assert_eq!(capture, "strong");
            }
            other => panic!("expected NumericCapture, got {other:?}"),
        }
    }

    #[test]
    fn captureless_pattern_fails_hard() {
        let table = table(&[("Frost", r"frost warning")]);

        let result = extract_measurement(&table, "frost warning issued");
        assert!(matches!(result, Err(EtlError::EmptyCapture { .. })));
    }
}
