//! Base-100 rebasing.
//!
//! Rescales every series so its value at an anchor date equals 100, making
//! sectors with very different index levels comparable on one chart.
//!
//! A series whose anchor value is missing or exactly zero is passed through
//! unchanged with an explicit status; this is a deliberate branch, never a
//! division fallthrough producing inf/NaN.

use chrono::NaiveDate;

use crate::domain::{RebaseStatus, RebasedColumn, RebasedTable, SectorTable};
use crate::error::AppError;

pub const BASE_VALUE: f64 = 100.0;

/// Rebase every column of `table` to [`BASE_VALUE`] at `anchor`.
///
/// `anchor = None` uses the earliest date in the table. An explicit anchor
/// that is not in the date index is a usage error: silently snapping to a
/// nearby date would change the meaning of the output.
pub fn rebase_table(table: &SectorTable, anchor: Option<NaiveDate>) -> Result<RebasedTable, AppError> {
    let Some(&first) = table.dates.first() else {
        return Err(AppError::no_data("Cannot rebase an empty table."));
    };

    let anchor = anchor.unwrap_or(first);
    let anchor_idx = table
        .dates
        .iter()
        .position(|&d| d == anchor)
        .ok_or_else(|| AppError::usage(format!("Anchor date {anchor} is not in the date index.")))?;

    let columns = table
        .columns
        .iter()
        .map(|col| {
            let (values, status) = match col.values.get(anchor_idx).copied().flatten() {
                None => (col.values.clone(), RebaseStatus::MissingAnchor),
                Some(v) if v == 0.0 => (col.values.clone(), RebaseStatus::ZeroAnchor),
                Some(anchor_value) => {
                    let rebased = col
                        .values
                        .iter()
                        .map(|v| v.map(|x| x / anchor_value * BASE_VALUE))
                        .collect();
                    (rebased, RebaseStatus::Rebased { anchor_value })
                }
            };
            RebasedColumn {
                sector: col.sector,
                values,
                status,
            }
        })
        .collect();

    Ok(RebasedTable {
        anchor,
        dates: table.dates.clone(),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sector, SectorColumn};

    fn table(values: Vec<Option<f64>>) -> SectorTable {
        let dates: Vec<NaiveDate> = (0..values.len())
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64))
            .collect();
        SectorTable {
            dates,
            columns: vec![SectorColumn {
                sector: Sector::Banking,
                values,
            }],
        }
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let v = actual.expect("value present");
        assert!((v - expected).abs() < 1e-9, "got {v}, want {expected}");
    }

    #[test]
    fn anchor_value_becomes_exactly_100() {
        let t = table(vec![Some(2057.3), Some(2100.0), Some(1990.5)]);
        let r = rebase_table(&t, None).unwrap();
        assert_eq!(r.anchor, t.dates[0]);
        assert_eq!(r.columns[0].values[0], Some(100.0));
        assert!(matches!(
            r.columns[0].status,
            RebaseStatus::Rebased { anchor_value } if anchor_value == 2057.3
        ));
    }

    #[test]
    fn rebase_scenario_with_second_anchor() {
        // [100, 110, 90, 120] anchored at 110 -> [90.9, 100, 81.8, 109.1].
        let t = table(vec![Some(100.0), Some(110.0), Some(90.0), Some(120.0)]);
        let r = rebase_table(&t, Some(t.dates[1])).unwrap();
        let vals = &r.columns[0].values;
        assert_close(vals[0], 100.0 / 110.0 * 100.0);
        assert_eq!(vals[1], Some(100.0));
        assert_close(vals[2], 90.0 / 110.0 * 100.0);
        assert_close(vals[3], 120.0 / 110.0 * 100.0);
        // Rounded to one decimal: 90.9, 100.0, 81.8, 109.1.
        assert_eq!((vals[0].unwrap() * 10.0).round() / 10.0, 90.9);
        assert_eq!((vals[2].unwrap() * 10.0).round() / 10.0, 81.8);
        assert_eq!((vals[3].unwrap() * 10.0).round() / 10.0, 109.1);
    }

    #[test]
    fn already_based_series_is_unchanged() {
        let t = table(vec![Some(100.0), Some(110.0), Some(90.0), Some(120.0)]);
        let r = rebase_table(&t, None).unwrap();
        assert_eq!(
            r.columns[0].values,
            vec![Some(100.0), Some(110.0), Some(90.0), Some(120.0)]
        );
    }

    #[test]
    fn rebasing_twice_is_idempotent() {
        let t = table(vec![Some(80.0), Some(88.0), Some(72.0)]);
        let once = rebase_table(&t, None).unwrap();
        let again = rebase_table(
            &SectorTable {
                dates: once.dates.clone(),
                columns: once
                    .columns
                    .iter()
                    .map(|c| SectorColumn {
                        sector: c.sector,
                        values: c.values.clone(),
                    })
                    .collect(),
            },
            Some(once.anchor),
        )
        .unwrap();
        for (a, b) in once.columns[0].values.iter().zip(&again.columns[0].values) {
            assert!((a.unwrap() - b.unwrap()).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_and_missing_anchors_pass_through() {
        let zero = table(vec![Some(0.0), Some(5.0)]);
        let r = rebase_table(&zero, None).unwrap();
        assert_eq!(r.columns[0].status, RebaseStatus::ZeroAnchor);
        assert_eq!(r.columns[0].values, vec![Some(0.0), Some(5.0)]);

        let missing = table(vec![None, Some(5.0)]);
        let r = rebase_table(&missing, None).unwrap();
        assert_eq!(r.columns[0].status, RebaseStatus::MissingAnchor);
        assert_eq!(r.columns[0].values, vec![None, Some(5.0)]);
    }

    #[test]
    fn unknown_anchor_is_a_usage_error() {
        let t = table(vec![Some(1.0), Some(2.0)]);
        let bad = NaiveDate::from_ymd_opt(1999, 1, 1).unwrap();
        let err = rebase_table(&t, Some(bad)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_table_is_a_no_data_error() {
        let t = SectorTable {
            dates: vec![],
            columns: vec![],
        };
        assert_eq!(rebase_table(&t, None).unwrap_err().exit_code(), 3);
    }
}
