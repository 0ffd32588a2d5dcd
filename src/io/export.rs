//! Result export: window rankings CSV and equity JSON.
//!
//! The equity JSON is a self-describing artifact: it carries enough metadata
//! (input label, lookback, cost) that `nrot plot` can redraw it later without
//! rerunning the backtest.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::domain::{BacktestResult, EquityFile};
use crate::error::AppError;
use crate::rotation::WindowSearch;

/// Identifies files written by this tool.
pub const TOOL_TAG: &str = "nepse-rotate";

/// Write the ranked window results as CSV, best first.
pub fn write_windows_csv(path: &Path, search: &WindowSearch) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::external(format!("Failed to create '{}': {e}", path.display())))?;
    let mut w = csv::Writer::from_writer(BufWriter::new(file));

    w.write_record([
        "rank",
        "lookback",
        "total_return_pct",
        "max_drawdown_pct",
        "sharpe",
        "switches",
        "days",
    ])
    .map_err(|e| AppError::external(format!("CSV write failed: {e}")))?;

    for (rank, r) in search.ranked.iter().enumerate() {
        let sharpe = r
            .summary
            .sharpe
            .map(|s| format!("{s:.4}"))
            .unwrap_or_default();
        w.write_record([
            (rank + 1).to_string(),
            r.lookback.to_string(),
            format!("{:.4}", r.summary.total_return_pct),
            format!("{:.4}", r.summary.max_drawdown_pct),
            sharpe,
            r.summary.switches.to_string(),
            r.summary.days.to_string(),
        ])
        .map_err(|e| AppError::external(format!("CSV write failed: {e}")))?;
    }

    w.flush()
        .map_err(|e| AppError::external(format!("CSV flush failed: {e}")))?;
    Ok(())
}

/// Save a backtest's equity curve and rotations as JSON.
pub fn write_equity_json(
    path: &Path,
    input_label: &str,
    cost_per_switch: f64,
    result: &BacktestResult,
) -> Result<(), AppError> {
    let payload = EquityFile {
        tool: TOOL_TAG.to_string(),
        input: input_label.to_string(),
        lookback: result.lookback,
        cost_per_switch,
        summary: result.summary.clone(),
        equity: result.equity.clone(),
        rotations: result.rotations.clone(),
    };
    let file = File::create(path)
        .map_err(|e| AppError::external(format!("Failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &payload)
        .map_err(|e| AppError::external(format!("JSON write failed: {e}")))?;
    Ok(())
}

/// Reload a previously saved equity JSON.
pub fn read_equity_json(path: &Path) -> Result<EquityFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open '{}': {e}", path.display())))?;
    let payload: EquityFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::usage(format!("Failed to parse '{}': {e}", path.display())))?;
    if payload.tool != TOOL_TAG {
        return Err(AppError::usage(format!(
            "'{}' was not written by this tool (tag '{}').",
            path.display(),
            payload.tool
        )));
    }
    if payload.equity.is_empty() {
        return Err(AppError::no_data(format!(
            "'{}' contains an empty equity curve.",
            path.display()
        )));
    }
    Ok(payload)
}
