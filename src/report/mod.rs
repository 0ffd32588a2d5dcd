//! Analysis summaries for terminal output.

pub mod format;

use crate::domain::{RebasedTable, Sector};
use crate::io::broker::BrokerRow;

/// One broker's net trading tilt.
///
/// `net_pct` is `(buy - sell) / (buy + sell) * 100`: +100 means the member
/// only bought, -100 only sold.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerNet {
    pub member: String,
    pub net_pct: f64,
}

/// Rank brokers by the magnitude of their net tilt, largest first.
///
/// Ties break alphabetically by member so reruns print identically.
pub fn rank_brokers(rows: &[BrokerRow], top_n: usize) -> Vec<BrokerNet> {
    let mut ranked: Vec<BrokerNet> = rows
        .iter()
        .map(|r| BrokerNet {
            member: r.member.clone(),
            net_pct: (r.buy - r.sell) / r.total() * 100.0,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.net_pct
            .abs()
            .partial_cmp(&a.net_pct.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.member.cmp(&b.member))
    });
    ranked.truncate(top_n);
    ranked
}

/// Pairwise Pearson correlation of daily sector returns.
///
/// `cells[i][j]` correlates `sectors[i]` with `sectors[j]`. A cell is `None`
/// when the two series share fewer than three overlapping return
/// observations or either side has zero variance.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub sectors: Vec<Sector>,
    pub cells: Vec<Vec<Option<f64>>>,
}

/// Correlate daily returns of every sector pair in the table.
pub fn correlation_matrix(table: &RebasedTable) -> CorrelationMatrix {
    let returns: Vec<(Sector, Vec<Option<f64>>)> = table
        .columns
        .iter()
        .map(|c| (c.sector, daily_returns(&c.values)))
        .collect();

    let sectors: Vec<Sector> = returns.iter().map(|(s, _)| *s).collect();
    let cells = returns
        .iter()
        .map(|(_, a)| {
            returns
                .iter()
                .map(|(_, b)| pearson(a, b))
                .collect()
        })
        .collect();

    CorrelationMatrix { sectors, cells }
}

fn daily_returns(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    for t in 1..values.len() {
        if let (Some(now), Some(prev)) = (values[t], values[t - 1]) {
            if prev != 0.0 && prev.is_finite() && now.is_finite() {
                out[t] = Some(now / prev - 1.0);
            }
        }
    }
    out
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(&x, &y)| Some((x?, y?)))
        .collect();
    if pairs.len() < 3 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(cov / denom)
}
