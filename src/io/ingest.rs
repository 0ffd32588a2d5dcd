//! Sector-table CSV ingest and normalization.
//!
//! This module turns a heterogeneous sector-index CSV into a clean
//! [`SectorTable`] that is safe to analyze.
//!
//! Design goals:
//! - **One fold policy** for headers (see `normalize::headers`)
//! - **Row-level tolerance**: skip bad rows, but report what happened
//! - **Deterministic output**: dates sorted and deduplicated, columns in
//!   canonical sector order
//! - **Separation of concerns**: no rebasing or backtest logic here

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use crate::calendar::{ParsedDate, parse_mixed_date};
use crate::domain::{Sector, SectorColumn, SectorTable};
use crate::error::AppError;
use crate::normalize::headers::{HeaderKind, canonicalize_header};

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// What ingest saw and what it kept.
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_used: usize,
    /// Rows dropped because an earlier row already claimed the date.
    pub duplicate_dates: usize,
    /// Folded headers that matched nothing in the mapping table. These
    /// columns are excluded from the output, not silently carried along.
    pub unrecognized_headers: Vec<String>,
    /// Canonical sectors that appeared under more than one raw header;
    /// only the first occurrence is kept.
    pub duplicate_headers: Vec<String>,
}

/// Ingest output: normalized table + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: SectorTable,
    pub stats: IngestStats,
    pub row_errors: Vec<RowError>,
}

/// Load and normalize a sector-index CSV from disk.
pub fn load_sector_table(path: &Path) -> Result<IngestedTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_sector_table(file)
}

/// Load and normalize a sector-index CSV from any reader.
pub fn read_sector_table<R: Read>(reader: R) -> Result<IngestedTable, AppError> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let mut stats = IngestStats::default();
    let mut date_idx: Option<usize> = None;
    let mut sector_cols: Vec<(Sector, usize)> = Vec::new();

    for (idx, raw) in headers.iter().enumerate() {
        match canonicalize_header(raw) {
            HeaderKind::Date => {
                if date_idx.is_some() {
                    return Err(AppError::usage(
                        "CSV has more than one date column after normalization.",
                    ));
                }
                date_idx = Some(idx);
            }
            HeaderKind::Sector(sector) => {
                if sector_cols.iter().any(|&(s, _)| s == sector) {
                    stats.duplicate_headers.push(sector.display_name().to_string());
                } else {
                    sector_cols.push((sector, idx));
                }
            }
            HeaderKind::Unrecognized(folded) => stats.unrecognized_headers.push(folded),
        }
    }

    let date_idx = date_idx.ok_or_else(|| {
        AppError::usage("No date column found (expected a `Date` / `BUSINESS_DATE` header).")
    })?;
    if sector_cols.is_empty() {
        return Err(AppError::usage(
            "No recognized sector columns found in the CSV header.",
        ));
    }
    // Canonical column order makes downstream tie-breaks reproducible.
    sector_cols.sort_by_key(|&(s, _)| s);

    let mut row_errors = Vec::new();
    // BTreeMap keeps dates sorted; first occurrence of a date wins.
    let mut rows: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

    for (idx, record) in csv.records().enumerate() {
        // Headers occupy line 1; records are 1-based after it.
        let line = idx + 2;
        stats.rows_read += 1;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = match parse_mixed_date(raw_date) {
            ParsedDate::Parsed { date, .. } => date,
            ParsedDate::Missing(reason) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Dropped row: date '{raw_date}' ({}).", reason.describe()),
                });
                continue;
            }
        };

        let values: Vec<Option<f64>> = sector_cols
            .iter()
            .map(|&(_, col_idx)| parse_cell(record.get(col_idx)))
            .collect();

        if rows.contains_key(&date) {
            stats.duplicate_dates += 1;
            continue;
        }
        rows.insert(date, values);
    }

    stats.rows_used = rows.len();
    if rows.is_empty() {
        return Err(AppError::no_data(
            "No valid rows remain after date normalization.",
        ));
    }

    let dates: Vec<NaiveDate> = rows.keys().copied().collect();
    let columns = sector_cols
        .iter()
        .enumerate()
        .map(|(col, &(sector, _))| SectorColumn {
            sector,
            values: rows.values().map(|vals| vals[col]).collect(),
        })
        .collect();

    Ok(IngestedTable {
        table: SectorTable { dates, columns },
        stats,
        row_errors,
    })
}

fn parse_cell(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    // Some exports thousands-separate index values.
    let v = s.replace(',', "").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn mixed_vintage_headers_normalize_to_one_table() {
        let csv = "\
BUSINESS_DATE,Banking SubIndex,Hydropower Index,Turnover (Rs)
2021-04-18,1500.5,2100.0,99
2078/01/06,1510.0,2090.0,98
";
        let out = read_sector_table(csv.as_bytes()).unwrap();
        assert_eq!(out.table.sectors(), vec![Sector::Banking, Sector::HydroPower]);
        assert_eq!(out.table.dates, vec![ymd(2021, 4, 18), ymd(2021, 4, 19)]);
        assert_eq!(out.stats.unrecognized_headers, vec!["turnover (rs)".to_string()]);
        assert_eq!(out.stats.rows_used, 2);
        assert!(out.row_errors.is_empty());
    }

    #[test]
    fn bad_dates_are_reported_not_fatal() {
        let csv = "\
Date,NEPSE Index
2021-04-18,2500
not-a-date,2600
40000000,2700
2021-04-20,2800
";
        let out = read_sector_table(csv.as_bytes()).unwrap();
        assert_eq!(out.stats.rows_read, 4);
        assert_eq!(out.stats.rows_used, 2);
        assert_eq!(out.row_errors.len(), 2);
        assert_eq!(out.row_errors[0].line, 3);
    }

    #[test]
    fn duplicate_dates_keep_first() {
        let csv = "\
Date,NEPSE Index
2021-04-18,2500
2021-04-18,9999
";
        let out = read_sector_table(csv.as_bytes()).unwrap();
        assert_eq!(out.stats.duplicate_dates, 1);
        assert_eq!(out.table.columns[0].values, vec![Some(2500.0)]);
    }

    #[test]
    fn rows_are_sorted_by_date() {
        let csv = "\
Date,NEPSE Index
2021-04-20,2700
2021-04-18,2500
2021-04-19,2600
";
        let out = read_sector_table(csv.as_bytes()).unwrap();
        assert_eq!(
            out.table.dates,
            vec![ymd(2021, 4, 18), ymd(2021, 4, 19), ymd(2021, 4, 20)]
        );
        assert_eq!(
            out.table.columns[0].values,
            vec![Some(2500.0), Some(2600.0), Some(2700.0)]
        );
    }

    #[test]
    fn empty_and_junk_cells_become_missing() {
        let csv = "\
Date,NEPSE Index,Banking
2021-04-18,,n/a
2021-04-19,\"2,612.5\",1500
";
        let out = read_sector_table(csv.as_bytes()).unwrap();
        let nepse = out.table.column(Sector::Nepse).unwrap();
        assert_eq!(nepse.values, vec![None, Some(2612.5)]);
        let banking = out.table.column(Sector::Banking).unwrap();
        assert_eq!(banking.values, vec![None, Some(1500.0)]);
    }

    #[test]
    fn missing_date_column_is_usage_error() {
        let csv = "NEPSE Index,Banking\n2500,1500\n";
        assert_eq!(
            read_sector_table(csv.as_bytes()).unwrap_err().exit_code(),
            2
        );
    }

    #[test]
    fn duplicate_sector_headers_keep_first_and_report() {
        let csv = "\
Date,Banking,BANKING SUB-INDEX
2021-04-18,1500,9999
";
        let out = read_sector_table(csv.as_bytes()).unwrap();
        assert_eq!(out.stats.duplicate_headers, vec!["Banking".to_string()]);
        assert_eq!(out.table.column(Sector::Banking).unwrap().values, vec![Some(1500.0)]);
    }

    #[test]
    fn all_rows_invalid_is_no_data() {
        let csv = "Date,Banking\njunk,1\nmore junk,2\n";
        assert_eq!(
            read_sector_table(csv.as_bytes()).unwrap_err().exit_code(),
            3
        );
    }
}
