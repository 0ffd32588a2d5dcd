//! Lookback-window search and ranking.
//!
//! The backtest is run for each candidate lookback window and the results are
//! ranked by annualized Sharpe ratio, best first. Windows the data cannot
//! support are skipped with a recorded reason (for diagnostics), never
//! treated as errors. The grid is embarrassingly parallel, so candidates run
//! on the rayon pool.

use rayon::prelude::*;

use crate::domain::{BacktestResult, RebasedTable};
use crate::error::AppError;
use crate::rotation::backtest::run_backtest;

/// Output of the window search.
#[derive(Debug, Clone)]
pub struct WindowSearch {
    /// Results ranked best-first. Never empty.
    pub ranked: Vec<BacktestResult>,
    /// Windows that produced no tradable signal, and why.
    pub skipped: Vec<(usize, String)>,
}

impl WindowSearch {
    pub fn best(&self) -> &BacktestResult {
        // Construction guarantees at least one ranked result.
        &self.ranked[0]
    }
}

/// Backtest every candidate window and rank the results.
pub fn search_windows(
    table: &RebasedTable,
    windows: &[usize],
    cost_per_switch: f64,
) -> Result<WindowSearch, AppError> {
    if windows.is_empty() {
        return Err(AppError::usage("No lookback windows given."));
    }
    if windows.iter().any(|&w| w == 0) {
        return Err(AppError::usage("Lookback windows must be >= 1."));
    }
    if !(cost_per_switch.is_finite() && cost_per_switch >= 0.0) {
        return Err(AppError::usage(format!(
            "Invalid transaction cost {cost_per_switch} (must be finite and >= 0)."
        )));
    }

    let outcomes: Vec<(usize, Option<BacktestResult>)> = windows
        .par_iter()
        .map(|&w| (w, run_backtest(table, w, cost_per_switch)))
        .collect();

    let mut ranked = Vec::new();
    let mut skipped = Vec::new();
    for (window, outcome) in outcomes {
        match outcome {
            Some(result) => ranked.push(result),
            None => skipped.push((
                window,
                format!("no sector has {} observations of history", window + 1),
            )),
        }
    }

    if ranked.is_empty() {
        return Err(AppError::no_data(
            "No lookback window produced a tradable signal (insufficient history).",
        ));
    }

    ranked.sort_by(|a, b| rank_key(b).partial_cmp(&rank_key(a)).unwrap_or(std::cmp::Ordering::Equal)
        .then(a.lookback.cmp(&b.lookback)));

    Ok(WindowSearch { ranked, skipped })
}

/// Sort key: Sharpe descending with undefined Sharpe last, ties broken by
/// total return. Final lookback tiebreak keeps the order reproducible.
fn rank_key(r: &BacktestResult) -> (f64, f64) {
    (
        r.summary.sharpe.unwrap_or(f64::NEG_INFINITY),
        r.summary.total_return_pct,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RebaseStatus, RebasedColumn, Sector};
    use chrono::NaiveDate;

    fn rebased(values: Vec<Option<f64>>) -> RebasedTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        RebasedTable {
            anchor: start,
            dates: (0..values.len())
                .map(|i| start + chrono::Duration::days(i as i64))
                .collect(),
            columns: vec![RebasedColumn {
                sector: Sector::Nepse,
                values,
                status: RebaseStatus::Rebased { anchor_value: 1.0 },
            }],
        }
    }

    fn wobbly_series(n: usize) -> Vec<Option<f64>> {
        (0..n)
            .map(|i| Some(100.0 + i as f64 + if i % 2 == 0 { 3.0 } else { 0.0 }))
            .collect()
    }

    #[test]
    fn oversized_windows_are_skipped_with_reason() {
        let t = rebased(wobbly_series(12));
        let search = search_windows(&t, &[2, 50], 0.0).unwrap();
        assert_eq!(search.ranked.len(), 1);
        assert_eq!(search.ranked[0].lookback, 2);
        assert_eq!(search.skipped.len(), 1);
        assert_eq!(search.skipped[0].0, 50);
    }

    #[test]
    fn all_windows_skipped_is_no_data() {
        let t = rebased(wobbly_series(3));
        let err = search_windows(&t, &[10, 20], 0.0).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_inputs_are_usage_errors() {
        let t = rebased(wobbly_series(12));
        assert_eq!(search_windows(&t, &[], 0.0).unwrap_err().exit_code(), 2);
        assert_eq!(search_windows(&t, &[0], 0.0).unwrap_err().exit_code(), 2);
        assert_eq!(
            search_windows(&t, &[2], f64::NAN).unwrap_err().exit_code(),
            2
        );
        assert_eq!(search_windows(&t, &[2], -0.1).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn ranking_is_sharpe_first_and_deterministic() {
        let t = rebased(wobbly_series(40));
        let search = search_windows(&t, &[2, 3, 5], 0.0).unwrap();
        assert_eq!(search.ranked.len(), 3);
        let sharpes: Vec<f64> = search
            .ranked
            .iter()
            .map(|r| r.summary.sharpe.unwrap_or(f64::NEG_INFINITY))
            .collect();
        for pair in sharpes.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        // Rerunning yields the same order.
        let again = search_windows(&t, &[2, 3, 5], 0.0).unwrap();
        let order: Vec<usize> = search.ranked.iter().map(|r| r.lookback).collect();
        let order2: Vec<usize> = again.ranked.iter().map(|r| r.lookback).collect();
        assert_eq!(order, order2);
    }
}
