//! Brokerwise trading-amount CSV ingest.
//!
//! The exchange's brokerwise sheet reduces to three columns: member name,
//! buy amount, sell amount. Ingest follows the same discipline as the sector
//! table: tolerant of bad rows, strict about schema, and everything dropped
//! is reported.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::AppError;
use crate::io::ingest::RowError;

/// One broker's buy/sell totals for the reporting period.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerRow {
    pub member: String,
    pub buy: f64,
    pub sell: f64,
}

impl BrokerRow {
    pub fn total(&self) -> f64 {
        self.buy + self.sell
    }
}

/// Ingest output: rows with positive total turnover, plus diagnostics.
#[derive(Debug, Clone)]
pub struct BrokerTable {
    pub rows: Vec<BrokerRow>,
    pub rows_read: usize,
    /// Rows dropped because buy + sell was zero or negative.
    pub zero_total: usize,
    pub row_errors: Vec<RowError>,
}

pub fn load_broker_table(path: &Path) -> Result<BrokerTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open broker CSV '{}': {e}", path.display()))
    })?;
    read_broker_table(file)
}

pub fn read_broker_table<R: Read>(reader: R) -> Result<BrokerTable, AppError> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let mut member_idx = None;
    let mut buy_idx = None;
    let mut sell_idx = None;
    for (idx, raw) in headers.iter().enumerate() {
        match raw.trim().to_ascii_lowercase().as_str() {
            "member" | "broker" | "member name" => member_idx = Some(idx),
            "buy" | "buy amount" | "purchase" => buy_idx = Some(idx),
            "sell" | "sell amount" | "sales" => sell_idx = Some(idx),
            _ => {}
        }
    }
    let (Some(member_idx), Some(buy_idx), Some(sell_idx)) = (member_idx, buy_idx, sell_idx)
    else {
        return Err(AppError::usage(
            "Broker CSV needs `member`, `buy`, and `sell` columns.",
        ));
    };

    let mut rows = Vec::new();
    let mut rows_read = 0usize;
    let mut zero_total = 0usize;
    let mut row_errors = Vec::new();

    for (idx, record) in csv.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

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

        let member = record.get(member_idx).unwrap_or("").trim().to_string();
        if member.is_empty() {
            row_errors.push(RowError {
                line,
                message: "Dropped row: empty member name.".to_string(),
            });
            continue;
        }
        let (Some(buy), Some(sell)) = (
            parse_amount(record.get(buy_idx)),
            parse_amount(record.get(sell_idx)),
        ) else {
            row_errors.push(RowError {
                line,
                message: format!("Dropped row: unparseable buy/sell amount for '{member}'."),
            });
            continue;
        };

        let row = BrokerRow { member, buy, sell };
        if row.total() <= 0.0 {
            zero_total += 1;
            continue;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AppError::no_data(
            "No broker rows with positive turnover remain.",
        ));
    }

    Ok(BrokerTable {
        rows,
        rows_read,
        zero_total,
        row_errors,
    })
}

fn parse_amount(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.replace(',', "").parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_drops_zero_totals() {
        let csv = "\
member,buy,sell
Broker A,\"1,000\",500
Broker B,0,0
Broker C,200,800
";
        let out = read_broker_table(csv.as_bytes()).unwrap();
        assert_eq!(out.rows_read, 3);
        assert_eq!(out.zero_total, 1);
        assert_eq!(
            out.rows,
            vec![
                BrokerRow {
                    member: "Broker A".to_string(),
                    buy: 1000.0,
                    sell: 500.0,
                },
                BrokerRow {
                    member: "Broker C".to_string(),
                    buy: 200.0,
                    sell: 800.0,
                },
            ]
        );
    }

    #[test]
    fn header_spellings_are_case_insensitive() {
        let csv = "Member Name,Buy Amount,Sell Amount\nX,10,5\n";
        let out = read_broker_table(csv.as_bytes()).unwrap();
        assert_eq!(out.rows[0].member, "X");
    }

    #[test]
    fn bad_rows_are_reported_not_fatal() {
        let csv = "member,buy,sell\nA,ten,5\n,10,5\nB,10,5\n";
        let out = read_broker_table(csv.as_bytes()).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.row_errors.len(), 2);
        assert_eq!(out.row_errors[0].line, 2);
    }

    #[test]
    fn missing_columns_are_a_usage_error() {
        let csv = "member,bought,sold\nA,10,5\n";
        assert_eq!(
            read_broker_table(csv.as_bytes()).unwrap_err().exit_code(),
            2
        );
    }

    #[test]
    fn all_zero_turnover_is_no_data() {
        let csv = "member,buy,sell\nA,0,0\nB,0,0\n";
        assert_eq!(
            read_broker_table(csv.as_bytes()).unwrap_err().exit_code(),
            3
        );
    }
}
