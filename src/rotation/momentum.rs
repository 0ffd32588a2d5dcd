//! Rolling momentum and leader selection.

use crate::domain::{RebasedTable, RotationPoint, Sector};

/// Rolling percentage change over `periods` observations.
///
/// `out[t]` is defined only when both `values[t]` and `values[t - periods]`
/// are present, finite, and the base is non-zero. The first `periods` slots
/// are always `None`: a series with fewer than `periods + 1` observations
/// contributes no signal at all.
pub fn pct_change(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if periods == 0 {
        return out;
    }
    for t in periods..values.len() {
        let (Some(now), Some(base)) = (values[t], values[t - periods]) else {
            continue;
        };
        if base == 0.0 || !base.is_finite() || !now.is_finite() {
            continue;
        }
        out[t] = Some((now / base - 1.0) * 100.0);
    }
    out
}

/// Momentum leader per date.
///
/// The leader is the sector with the maximum momentum among sectors whose
/// momentum is defined that date. Ties break to the sector that sorts first
/// in canonical order; since table columns are kept in canonical order and
/// the comparison is strict, the first maximal sector wins.
pub fn leaders(table: &RebasedTable, lookback: usize) -> Vec<Option<Sector>> {
    let momentum: Vec<(Sector, Vec<Option<f64>>)> = table
        .columns
        .iter()
        .map(|c| (c.sector, pct_change(&c.values, lookback)))
        .collect();

    let n = table.dates.len();
    let mut out = vec![None; n];
    for (t, slot) in out.iter_mut().enumerate() {
        let mut best: Option<(Sector, f64)> = None;
        for (sector, series) in &momentum {
            let Some(m) = series[t] else { continue };
            match best {
                Some((_, best_m)) if m <= best_m => {}
                _ => best = Some((*sector, m)),
            }
        }
        *slot = best.map(|(s, _)| s);
    }
    out
}

/// Dates where the leader differs from the previous date's leader.
pub fn rotation_points(table: &RebasedTable, leaders: &[Option<Sector>]) -> Vec<RotationPoint> {
    let mut out = Vec::new();
    let mut prev: Option<Sector> = None;
    for (t, cur) in leaders.iter().enumerate() {
        if let Some(to) = *cur {
            if prev != Some(to) {
                out.push(RotationPoint {
                    date: table.dates[t],
                    from: prev,
                    to,
                });
            }
            prev = Some(to);
        }
    }
    out
}
