//! Rotation strategy simulation.
//!
//! Strategy: each day, hold the previous date's momentum leader and earn its
//! daily return. On a day the leader changes, pay a fixed transaction cost
//! once. Equity compounds from 1.0 starting on the first date a leader is
//! defined.

use crate::domain::{BacktestResult, BacktestSummary, EquityPoint, RebasedTable, Sector};
use crate::rotation::momentum::{leaders, rotation_points};

/// Trading days per year used to annualize the Sharpe ratio.
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Run the rotation backtest for one lookback window.
///
/// Returns `None` when no date has a defined leader (every sector is shorter
/// than `lookback + 1` observations); the caller records this as a skipped
/// window, not an error.
pub fn run_backtest(table: &RebasedTable, lookback: usize, cost_per_switch: f64) -> Option<BacktestResult> {
    let leader_by_date = leaders(table, lookback);
    let start = leader_by_date.iter().position(Option::is_some)?;

    let mut held = leader_by_date[start]?;
    let mut equity = 1.0_f64;
    let mut curve = vec![EquityPoint {
        date: table.dates[start],
        value: equity,
    }];
    let mut returns = Vec::with_capacity(table.dates.len() - start);
    let mut switches = 0usize;

    for t in (start + 1)..table.dates.len() {
        // Return of the sector held overnight. A missing print on either side
        // leaves equity flat for the day.
        let mut r = daily_return(table, held, t).unwrap_or(0.0);

        if let Some(new_leader) = leader_by_date[t] {
            if new_leader != held {
                r -= cost_per_switch;
                switches += 1;
                held = new_leader;
            }
        }

        equity *= 1.0 + r;
        returns.push(r);
        curve.push(EquityPoint {
            date: table.dates[t],
            value: equity,
        });
    }

    let summary = BacktestSummary {
        total_return_pct: (equity - 1.0) * 100.0,
        max_drawdown_pct: max_drawdown_pct(&curve),
        sharpe: annualized_sharpe(&returns),
        switches,
        days: returns.len(),
    };

    Some(BacktestResult {
        lookback,
        start_date: table.dates[start],
        equity: curve,
        rotations: rotation_points(table, &leader_by_date),
        summary,
    })
}

fn daily_return(table: &RebasedTable, sector: Sector, t: usize) -> Option<f64> {
    let col = table.column(sector)?;
    let now = col.values[t]?;
    let prev = col.values[t - 1]?;
    if prev == 0.0 || !prev.is_finite() || !now.is_finite() {
        return None;
    }
    Some(now / prev - 1.0)
}

/// Largest peak-to-trough relative decline of the equity curve, as a
/// negative percentage. A monotonically rising curve reports 0.
pub fn max_drawdown_pct(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for p in curve {
        peak = peak.max(p.value);
        if peak > 0.0 {
            let dd = (p.value - peak) / peak * 100.0;
            worst = worst.min(dd);
        }
    }
    worst
}

/// Mean daily return over its sample std dev, annualized by sqrt(252).
/// `None` when there are fewer than two returns or the std dev is zero.
pub fn annualized_sharpe(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std == 0.0 || !std.is_finite() {
        return None;
    }
    Some(mean / std * TRADING_DAYS_PER_YEAR.sqrt())
}
