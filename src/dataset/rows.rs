//! Row filter: raw CSV rows to typed reference values plus a zero-filled
//! history window.

use super::{RawRow, YearValue, YearWindow, CODE_COLUMN};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A CSV row that survived filtering
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub code: String,
    /// Reference-year figure
    pub value: f64,
    pub history: Vec<YearValue>,
}

/// Reference-year cell after parsing
#[derive(Debug, Clone, Copy, PartialEq)]
enum Reference {
    /// Empty, whitespace-only or absent
    Missing,
    /// Not a number, or not finite (`NaN`, `inf`, overflow)
    Invalid,
    Value(f64),
}

fn parse_current(cell: Option<&String>) -> Reference {
    match cell.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        None => Reference::Missing,
        Some(text) => match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Reference::Value(v),
            _ => Reference::Invalid,
        },
    }
}

/// Parse a history cell: empty or non-numeric means 0
fn parse_history(cell: Option<&String>) -> f64 {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Extract the history series for the window
pub fn history(row: &RawRow, window: &YearWindow) -> Vec<YearValue> {
    window
        .years()
        .map(|year| YearValue {
            year,
            value: parse_history(row.get(&year.to_string())),
        })
        .collect()
}

/// Convert one raw row. `None` when the row has no code or no usable
/// reference-year figure.
pub fn parse_row(row: &RawRow, window: &YearWindow) -> Option<MetricRow> {
    let code = row.get(CODE_COLUMN).map(|s| s.trim()).filter(|s| !s.is_empty())?;
    let reference = window.reference.to_string();
    let value = match parse_current(row.get(&reference)) {
        Reference::Value(v) => v,
        Reference::Missing => return None,
        Reference::Invalid => {
            warn!(code, column = %reference, "dropping row with non-numeric reference value");
            return None;
        }
    };
    Some(MetricRow {
        code: code.to_string(),
        value,
        history: history(row, window),
    })
}

/// Filter and parse a table, keyed by country code. Later rows replace
/// earlier ones with the same code.
pub fn parse_table(rows: &[RawRow], window: &YearWindow) -> HashMap<String, MetricRow> {
    let mut table = HashMap::with_capacity(rows.len());
    for row in rows {
        if let Some(parsed) = parse_row(row, window) {
            table.insert(parsed.code.clone(), parsed);
        }
    }
    debug!(
        kept = table.len(),
        dropped = rows.len() - table.len(),
        "parsed table"
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn window() -> YearWindow {
        YearWindow {
            reference: 2001,
            from: 2000,
            to: 2001,
        }
    }

    #[test]
    fn test_empty_history_cell_is_zero() {
        let r = row(&[("Country Code", "FRA"), ("2000", ""), ("2001", "5.0")]);
        let parsed = parse_row(&r, &window()).unwrap();
        assert_eq!(parsed.value, 5.0);
        assert_eq!(
            parsed.history,
            vec![
                YearValue { year: 2000, value: 0.0 },
                YearValue { year: 2001, value: 5.0 },
            ]
        );
    }

    #[test]
    fn test_empty_reference_cell_drops_row() {
        let r = row(&[("Country Code", "FRA"), ("2000", "3.0"), ("2001", "")]);
        assert!(parse_row(&r, &window()).is_none());
    }

    #[test]
    fn test_missing_reference_column_drops_row() {
        let r = row(&[("Country Code", "FRA"), ("2000", "3.0")]);
        assert!(parse_row(&r, &window()).is_none());
    }

    #[test]
    fn test_non_numeric_reference_drops_row() {
        let r = row(&[("Country Code", "FRA"), ("2001", "n/a")]);
        assert!(parse_row(&r, &window()).is_none());
    }

    #[test]
    fn test_non_finite_reference_drops_row() {
        for cell in ["NaN", "inf", "-inf", "1e400"] {
            let r = row(&[("Country Code", "FRA"), ("2001", cell)]);
            assert!(parse_row(&r, &window()).is_none(), "{cell}");
        }
    }

    #[test]
    fn test_non_finite_rows_leave_table_stable() {
        let rows = vec![
            row(&[("Country Code", "AAA"), ("2001", "NaN")]),
            row(&[("Country Code", "BBB"), ("2001", "inf")]),
            row(&[("Country Code", "CCC"), ("2000", "NaN"), ("2001", "1e5")]),
        ];
        let first = parse_table(&rows, &window());
        assert_eq!(first.len(), 1);
        assert_eq!(first["CCC"].value, 1e5);
        assert_eq!(first["CCC"].history[0].value, 0.0);
        assert_eq!(first, parse_table(&rows, &window()));
    }

    #[test]
    fn test_non_numeric_history_is_zero() {
        let r = row(&[("Country Code", "FRA"), ("2000", ".."), ("2001", "1")]);
        let parsed = parse_row(&r, &window()).unwrap();
        assert_eq!(parsed.history[0].value, 0.0);
    }

    #[test]
    fn test_row_without_code_is_dropped() {
        let r = row(&[("Country Code", " "), ("2001", "1")]);
        assert!(parse_row(&r, &window()).is_none());
    }

    #[test]
    fn test_table_last_row_wins() {
        let rows = vec![
            row(&[("Country Code", "FRA"), ("2001", "1")]),
            row(&[("Country Code", "DEU"), ("2001", "")]),
            row(&[("Country Code", "FRA"), ("2001", "2")]),
        ];
        let table = parse_table(&rows, &window());
        assert_eq!(table.len(), 1);
        assert_eq!(table["FRA"].value, 2.0);
    }
}
