//! Market summary and market capitalization JSON ingest.
//!
//! The exchange API dumps arrive as JSON arrays of daily records. Field names
//! follow the upstream camelCase wire format; serde renames keep the Rust
//! side conventional.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One day of exchange-wide trading activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummaryRow {
    pub business_date: NaiveDate,
    pub total_turnover: f64,
    pub total_traded_shares: f64,
    pub total_transactions: f64,
    pub traded_scrips: f64,
}

impl MarketSummaryRow {
    /// Average turnover per traded scrip; `None` when no scrips traded.
    pub fn avg_turnover_per_scrip(&self) -> Option<f64> {
        if self.traded_scrips > 0.0 {
            Some(self.total_turnover / self.traded_scrips)
        } else {
            None
        }
    }
}

/// One day of market capitalization figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCapRow {
    pub business_date: NaiveDate,
    pub mar_cap: f64,
    pub float_mar_cap: f64,
    pub sen_mar_cap: f64,
    pub sen_float_mar_cap: f64,
}

pub fn load_market_summary(path: &Path) -> Result<Vec<MarketSummaryRow>, AppError> {
    let mut rows: Vec<MarketSummaryRow> = read_json_rows(path)?;
    rows.sort_by_key(|r| r.business_date);
    if rows.is_empty() {
        return Err(AppError::no_data(format!(
            "Market summary '{}' contains no rows.",
            path.display()
        )));
    }
    Ok(rows)
}

pub fn load_market_cap(path: &Path) -> Result<Vec<MarketCapRow>, AppError> {
    let mut rows: Vec<MarketCapRow> = read_json_rows(path)?;
    rows.sort_by_key(|r| r.business_date);
    if rows.is_empty() {
        return Err(AppError::no_data(format!(
            "Market cap file '{}' contains no rows.",
            path.display()
        )));
    }
    Ok(rows)
}

fn read_json_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open '{}': {e}", path.display())))?;
    parse_json_rows(file, path)
}

fn parse_json_rows<T: serde::de::DeserializeOwned, R: Read>(
    reader: R,
    path: &Path,
) -> Result<Vec<T>, AppError> {
    serde_json::from_reader(reader)
        .map_err(|e| AppError::usage(format!("Failed to parse JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_rows_deserialize_from_wire_format() {
        let json = r#"[
            {"businessDate":"2021-04-19","totalTurnover":5.0e9,"totalTradedShares":1.2e7,
             "totalTransactions":55000,"tradedScrips":220},
            {"businessDate":"2021-04-18","totalTurnover":4.4e9,"totalTradedShares":1.0e7,
             "totalTransactions":51000,"tradedScrips":200}
        ]"#;
        let mut rows: Vec<MarketSummaryRow> =
            parse_json_rows(json.as_bytes(), Path::new("test.json")).unwrap();
        rows.sort_by_key(|r| r.business_date);
        assert_eq!(
            rows[0].business_date,
            NaiveDate::from_ymd_opt(2021, 4, 18).unwrap()
        );
        assert!((rows[0].avg_turnover_per_scrip().unwrap() - 4.4e9 / 200.0).abs() < 1e-6);
    }

    #[test]
    fn zero_scrips_has_no_average() {
        let row = MarketSummaryRow {
            business_date: NaiveDate::from_ymd_opt(2021, 4, 18).unwrap(),
            total_turnover: 0.0,
            total_traded_shares: 0.0,
            total_transactions: 0.0,
            traded_scrips: 0.0,
        };
        assert_eq!(row.avg_turnover_per_scrip(), None);
    }

    #[test]
    fn cap_rows_deserialize() {
        let json = r#"[{"businessDate":"2021-04-18","marCap":4.0e12,
            "floatMarCap":1.4e12,"senMarCap":3.4e12,"senFloatMarCap":1.2e12}]"#;
        let rows: Vec<MarketCapRow> =
            parse_json_rows(json.as_bytes(), Path::new("test.json")).unwrap();
        assert!((rows[0].float_mar_cap - 1.4e12).abs() < 1.0);
    }
}
