//! Incremental sector-index fetcher for the exchange API.
//!
//! The API serves one business date per request, so a full history is built
//! by iterating trading days and appending to a local CSV. The fetcher is
//! resumable: it reads the last `business_date` already on disk and continues
//! from the next trading day. Fridays and Saturdays (the Nepali weekend) are
//! never requested; an empty response for a weekday is treated as a market
//! holiday, not an error.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://www.nepalstock.com/api/nots/index-history";
/// Pause between requests so the fetcher stays a polite client.
const REQUEST_DELAY: StdDuration = StdDuration::from_millis(1500);

#[derive(Debug, Clone, Default)]
pub struct FetchStats {
    pub days_requested: usize,
    pub rows_written: usize,
    pub holidays: usize,
    /// First date actually requested (after resume), if any.
    pub resumed_from: Option<NaiveDate>,
}

pub struct SectorClient {
    client: Client,
    token: String,
    base_url: String,
}

impl SectorClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let token = std::env::var("NEPSE_API_TOKEN")
            .map_err(|_| AppError::usage("Missing NEPSE_API_TOKEN in environment (.env)."))?;
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .build()
            .map_err(|e| AppError::external(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Fetch every trading day in `[start, end]` and append rows to `out`.
    ///
    /// A 401 from the API halts the run immediately (the token has expired;
    /// every further request would fail the same way). Rows already on disk
    /// are never re-fetched.
    pub fn fetch_range(
        &self,
        out: &Path,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchStats, AppError> {
        if end < start {
            return Err(AppError::usage(format!(
                "Fetch range is empty: {start} .. {end}."
            )));
        }

        let mut header = read_existing_header(out)?;
        let effective_start = match read_last_date(out, header.as_deref())? {
            Some(last) if last >= end => {
                return Ok(FetchStats::default());
            }
            Some(last) => last + Duration::days(1),
            None => start,
        };

        let mut stats = FetchStats {
            resumed_from: Some(effective_start),
            ..FetchStats::default()
        };

        let mut date = effective_start;
        let mut first_request = true;
        while date <= end {
            if matches!(date.weekday(), Weekday::Fri | Weekday::Sat) {
                date += Duration::days(1);
                continue;
            }
            if !first_request {
                std::thread::sleep(REQUEST_DELAY);
            }
            first_request = false;

            let rows = self.fetch_day(date)?;
            stats.days_requested += 1;
            if rows.is_empty() {
                stats.holidays += 1;
                date += Duration::days(1);
                continue;
            }

            if header.is_none() {
                header = Some(derive_header(&rows[0]));
            }
            let header = header.as_ref().ok_or_else(|| {
                AppError::external("Internal error: missing CSV header after derivation.")
            })?;
            stats.rows_written += append_rows(out, header, date, &rows)?;
            date += Duration::days(1);
        }

        Ok(stats)
    }

    /// One day's sector index records, as raw JSON objects.
    fn fetch_day(&self, date: NaiveDate) -> Result<Vec<serde_json::Map<String, Value>>, AppError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("businessDate", date.format("%Y-%m-%d").to_string())])
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| AppError::external(format!("Request for {date} failed: {e}")))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::external(format!(
                "API rejected the token (401) at {date}; refresh NEPSE_API_TOKEN and rerun to resume."
            )));
        }
        if !response.status().is_success() {
            return Err(AppError::external(format!(
                "API returned {} for {date}.",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .map_err(|e| AppError::external(format!("Bad JSON for {date}: {e}")))?;
        match body {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(AppError::external(format!(
                        "Unexpected JSON element for {date}: {other}"
                    ))),
                })
                .collect(),
            other => Err(AppError::external(format!(
                "Expected a JSON array for {date}, got: {other}"
            ))),
        }
    }
}

/// CSV columns: `business_date` first, then the record's keys sorted so the
/// layout never depends on JSON object ordering.
fn derive_header(row: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<String> = row.keys().cloned().collect();
    keys.sort();
    let mut header = vec!["business_date".to_string()];
    header.extend(keys);
    header
}

fn read_existing_header(path: &Path) -> Result<Option<Vec<String>>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open '{}': {e}", path.display())))?;
    let mut reader = csv::Reader::from_reader(file);
    let header = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Bad CSV header in '{}': {e}", path.display())))?;
    if header.is_empty() {
        return Ok(None);
    }
    Ok(Some(header.iter().map(str::to_string).collect()))
}

/// Latest `business_date` already present in the output file.
fn read_last_date(path: &Path, header: Option<&[String]>) -> Result<Option<NaiveDate>, AppError> {
    let Some(header) = header else {
        return Ok(None);
    };
    let Some(col) = header.iter().position(|h| h == "business_date") else {
        return Err(AppError::usage(format!(
            "'{}' exists but has no business_date column; refusing to append.",
            path.display()
        )));
    };
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open '{}': {e}", path.display())))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut last: Option<NaiveDate> = None;
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::usage(format!("Bad row in '{}': {e}", path.display())))?;
        if let Some(date) = record
            .get(col)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        {
            last = Some(last.map_or(date, |prev| prev.max(date)));
        }
    }
    Ok(last)
}

fn append_rows(
    path: &Path,
    header: &[String],
    date: NaiveDate,
    rows: &[serde_json::Map<String, Value>],
) -> Result<usize, AppError> {
    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::external(format!("Failed to open '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    if is_new {
        writeln!(out, "{}", header.join(","))
            .map_err(|e| AppError::external(format!("Write failed: {e}")))?;
    }

    let mut written = 0;
    for row in rows {
        let fields: Vec<String> = header
            .iter()
            .map(|col| {
                if col == "business_date" {
                    date.format("%Y-%m-%d").to_string()
                } else {
                    csv_field(row.get(col.as_str()))
                }
            })
            .collect();
        writeln!(out, "{}", fields.join(","))
            .map_err(|e| AppError::external(format!("Write failed: {e}")))?;
        written += 1;
    }
    out.flush()
        .map_err(|e| AppError::external(format!("Flush failed: {e}")))?;
    Ok(written)
}

fn csv_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => {
            if s.contains([',', '"', '\n']) {
                format!("\"{}\"", s.replace('"', "\"\""))
            } else {
                s.clone()
            }
        }
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_is_business_date_plus_sorted_keys() {
        let row = json!({"index":"Banking SubIndex","closingIndex":1500.5,"absoluteChange":-3.2});
        let Value::Object(map) = row else { unreachable!() };
        assert_eq!(
            derive_header(&map),
            vec!["business_date", "absoluteChange", "closingIndex", "index"]
        );
    }

    #[test]
    fn csv_fields_quote_only_when_needed() {
        assert_eq!(csv_field(Some(&json!("Banking"))), "Banking");
        assert_eq!(csv_field(Some(&json!("a,b"))), "\"a,b\"");
        assert_eq!(csv_field(Some(&json!(1500.5))), "1500.5");
        assert_eq!(csv_field(Some(&Value::Null)), "");
        assert_eq!(csv_field(None), "");
    }

    #[test]
    fn resume_picks_up_after_last_written_date() {
        let dir = std::env::temp_dir().join("nrot-fetch-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("resume.csv");
        std::fs::write(
            &path,
            "business_date,closingIndex,index\n\
             2021-04-18,1500.5,Banking SubIndex\n\
             2021-04-19,1510.0,Banking SubIndex\n",
        )
        .unwrap();

        let header = read_existing_header(&path).unwrap().unwrap();
        let last = read_last_date(&path, Some(&header)).unwrap();
        assert_eq!(last, Some(NaiveDate::from_ymd_opt(2021, 4, 19).unwrap()));
    }

    #[test]
    fn appending_skips_header_on_existing_file() {
        let dir = std::env::temp_dir().join("nrot-fetch-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("append.csv");
        let _ = std::fs::remove_file(&path);

        let header = vec!["business_date".to_string(), "closingIndex".to_string()];
        let date = NaiveDate::from_ymd_opt(2021, 4, 18).unwrap();
        let row = {
            let Value::Object(map) = json!({"closingIndex": 1500.5}) else {
                unreachable!()
            };
            map
        };
        append_rows(&path, &header, date, std::slice::from_ref(&row)).unwrap();
        append_rows(
            &path,
            &header,
            date + Duration::days(1),
            std::slice::from_ref(&row),
        )
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "business_date,closingIndex");
        assert!(lines[1].starts_with("2021-04-18"));
        assert!(lines[2].starts_with("2021-04-19"));
    }

    #[test]
    fn foreign_csv_without_date_column_is_rejected() {
        let dir = std::env::temp_dir().join("nrot-fetch-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("foreign.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        let header = read_existing_header(&path).unwrap().unwrap();
        assert_eq!(
            read_last_date(&path, Some(&header)).unwrap_err().exit_code(),
            2
        );
    }
}
