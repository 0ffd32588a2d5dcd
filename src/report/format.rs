//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{BacktestResult, RebaseStatus, RebasedTable, RotationPoint};
use crate::io::ingest::IngestedTable;
use crate::io::summary::{MarketCapRow, MarketSummaryRow};
use crate::report::{BrokerNet, CorrelationMatrix};
use crate::rotation::WindowSearch;

/// Format the run header: dataset stats, normalization diagnostics, anchor.
pub fn format_run_summary(ingest: &IngestedTable, rebased: &RebasedTable) -> String {
    let mut out = String::new();

    out.push_str("=== nrot - NEPSE Sector Rotation ===\n");
    out.push_str(&format!(
        "Rows: {} read, {} used ({} duplicate dates dropped)\n",
        ingest.stats.rows_read, ingest.stats.rows_used, ingest.stats.duplicate_dates,
    ));
    out.push_str(&format!(
        "Dates: {} .. {}\n",
        rebased.dates.first().map(|d| d.to_string()).unwrap_or_default(),
        rebased.dates.last().map(|d| d.to_string()).unwrap_or_default(),
    ));
    out.push_str(&format!("Rebase anchor: {} (base 100)\n", rebased.anchor));
    out.push_str(&format!("Sectors: {}\n", rebased.columns.len()));

    for col in &rebased.columns {
        match col.status {
            RebaseStatus::Rebased { .. } => {}
            RebaseStatus::MissingAnchor => out.push_str(&format!(
                "  (pass-through) {}: no value at anchor date\n",
                col.sector
            )),
            RebaseStatus::ZeroAnchor => out.push_str(&format!(
                "  (pass-through) {}: anchor value is zero\n",
                col.sector
            )),
        }
    }

    if !ingest.stats.unrecognized_headers.is_empty() {
        out.push_str(&format!(
            "Excluded columns: {}\n",
            ingest.stats.unrecognized_headers.join(", ")
        ));
    }
    for dup in &ingest.stats.duplicate_headers {
        out.push_str(&format!("  (duplicate header) {dup}: first occurrence kept\n"));
    }
    if !ingest.row_errors.is_empty() {
        out.push_str(&format!("Dropped rows: {}\n", ingest.row_errors.len()));
        for err in ingest.row_errors.iter().take(5) {
            out.push_str(&format!("  line {}: {}\n", err.line, err.message));
        }
        if ingest.row_errors.len() > 5 {
            out.push_str(&format!("  ... and {} more\n", ingest.row_errors.len() - 5));
        }
    }
    out.push('\n');

    out
}

/// Format the ranked lookback windows, best marked with `*`.
pub fn format_window_rankings(search: &WindowSearch) -> String {
    let mut out = String::new();

    out.push_str("Lookback windows (ranked by Sharpe):\n");
    out.push_str(&format!(
        "  {:<8} {:>12} {:>12} {:>8} {:>9} {:>6}\n",
        "window", "return%", "maxDD%", "sharpe", "switches", "days"
    ));
    let best = search.best().lookback;
    for r in &search.ranked {
        let marker = if r.lookback == best { "*" } else { " " };
        let sharpe = r
            .summary
            .sharpe
            .map(|s| format!("{s:>8.3}"))
            .unwrap_or_else(|| format!("{:>8}", "n/a"));
        out.push_str(&format!(
            "{marker} {:<8} {:>12.2} {:>12.2} {sharpe} {:>9} {:>6}\n",
            r.lookback,
            r.summary.total_return_pct,
            r.summary.max_drawdown_pct,
            r.summary.switches,
            r.summary.days,
        ));
    }
    for (window, reason) in &search.skipped {
        out.push_str(&format!("  (skipped {window}) {reason}\n"));
    }
    out.push('\n');

    out
}

/// Format the most recent rotations of the winning window.
pub fn format_rotation_log(best: &BacktestResult, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Rotations (window={}, last {} of {}):\n",
        best.lookback,
        top_n.min(best.rotations.len()),
        best.rotations.len(),
    ));
    let skip = best.rotations.len().saturating_sub(top_n);
    for p in best.rotations.iter().skip(skip) {
        out.push_str(&format_rotation_line(p));
    }
    out.push('\n');

    out
}

fn format_rotation_line(p: &RotationPoint) -> String {
    match p.from {
        Some(from) => format!("  {}  {} -> {}\n", p.date, from, p.to),
        None => format!("  {}  (start) -> {}\n", p.date, p.to),
    }
}

/// Format the correlation matrix with abbreviated sector labels.
pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();

    out.push_str("Daily-return correlation:\n");
    out.push_str(&format!("{:<10}", ""));
    for s in &matrix.sectors {
        out.push_str(&format!(" {:>6}", abbreviate(s.display_name())));
    }
    out.push('\n');

    for (i, s) in matrix.sectors.iter().enumerate() {
        out.push_str(&format!("{:<10}", abbreviate(s.display_name())));
        for cell in &matrix.cells[i] {
            match cell {
                Some(c) => out.push_str(&format!(" {c:>6.2}")),
                None => out.push_str(&format!(" {:>6}", "-")),
            }
        }
        out.push('\n');
    }
    out.push('\n');

    out
}

/// Format market activity and capitalization rows for terminal display.
pub fn format_market_summary(summary: &[MarketSummaryRow], caps: &[MarketCapRow]) -> String {
    let mut out = String::new();

    out.push_str("Market summary:\n");
    out.push_str(&format!(
        "  {:<12} {:>16} {:>10} {:>14} {:>14}\n",
        "date", "turnover", "scrips", "transactions", "avg/scrip"
    ));
    for r in summary {
        let avg = r
            .avg_turnover_per_scrip()
            .map(|v| format!("{v:>14.0}"))
            .unwrap_or_else(|| format!("{:>14}", "-"));
        out.push_str(&format!(
            "  {:<12} {:>16.0} {:>10.0} {:>14.0} {avg}\n",
            r.business_date, r.total_turnover, r.traded_scrips, r.total_transactions,
        ));
    }

    if !caps.is_empty() {
        out.push_str("\nMarket capitalization:\n");
        out.push_str(&format!(
            "  {:<12} {:>16} {:>16} {:>16}\n",
            "date", "total", "float", "sensitive"
        ));
        for r in caps {
            out.push_str(&format!(
                "  {:<12} {:>16.0} {:>16.0} {:>16.0}\n",
                r.business_date, r.mar_cap, r.float_mar_cap, r.sen_mar_cap,
            ));
        }
    }
    out.push('\n');

    out
}

/// Format the broker net buy/sell ranking.
pub fn format_broker_ranking(ranking: &[BrokerNet]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Top {} brokers by net trading percentage:\n",
        ranking.len()
    ));
    out.push_str(&format!("  {:<32} {:>8}\n", "member", "net%"));
    for b in ranking {
        out.push_str(&format!("  {:<32} {:>8.2}\n", b.member, b.net_pct));
    }
    out.push('\n');

    out
}

fn abbreviate(name: &str) -> String {
    name.chars()
        .filter(|&c| !c.is_whitespace() && c != '-')
        .take(6)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BacktestSummary, EquityPoint, Sector};
    use chrono::NaiveDate;

    fn result_with(lookback: usize, sharpe: Option<f64>) -> BacktestResult {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        BacktestResult {
            lookback,
            start_date: d,
            equity: vec![EquityPoint { date: d, value: 1.0 }],
            rotations: vec![
                RotationPoint { date: d, from: None, to: Sector::Banking },
                RotationPoint {
                    date: d + chrono::Duration::days(5),
                    from: Some(Sector::Banking),
                    to: Sector::HydroPower,
                },
            ],
            summary: BacktestSummary {
                total_return_pct: 12.5,
                max_drawdown_pct: -8.0,
                sharpe,
                switches: 1,
                days: 10,
            },
        }
    }

    #[test]
    fn rankings_mark_the_best_window() {
        let search = WindowSearch {
            ranked: vec![result_with(10, Some(1.2)), result_with(20, Some(0.4))],
            skipped: vec![(90, "no sector has 91 observations of history".to_string())],
        };
        let text = format_window_rankings(&search);
        assert!(text.contains("* 10"));
        assert!(text.contains("  20"));
        assert!(text.contains("(skipped 90)"));
    }

    #[test]
    fn undefined_sharpe_prints_na() {
        let search = WindowSearch {
            ranked: vec![result_with(10, None)],
            skipped: vec![],
        };
        assert!(format_window_rankings(&search).contains("n/a"));
    }

    #[test]
    fn rotation_log_shows_most_recent_first_to_last() {
        let best = result_with(10, Some(1.0));
        let text = format_rotation_log(&best, 1);
        assert!(text.contains("Banking -> Hydro Power"));
        assert!(!text.contains("(start)"));
        let full = format_rotation_log(&best, 10);
        assert!(full.contains("(start) -> Banking"));
    }

    #[test]
    fn broker_ranking_formats_signed_percentages() {
        let ranking = vec![
            BrokerNet {
                member: "Broker B".to_string(),
                net_pct: -60.0,
            },
            BrokerNet {
                member: "Broker A".to_string(),
                net_pct: 33.33,
            },
        ];
        let text = format_broker_ranking(&ranking);
        assert!(text.contains("Top 2 brokers"));
        assert!(text.contains("-60.00"));
        assert!(text.contains("33.33"));
    }

    #[test]
    fn abbreviate_strips_spaces_and_caps_length() {
        assert_eq!(abbreviate("Hydro Power"), "HydroP");
        assert_eq!(abbreviate("NEPSE"), "NEPSE");
        assert_eq!(abbreviate("Non-Life Insurance"), "NonLif");
    }
}
