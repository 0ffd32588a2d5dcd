//! Mixed-calendar date parsing.
//!
//! NEPSE spreadsheet exports mix three date encodings in the same column,
//! with no schema declaring which one a given cell uses:
//!
//! - spreadsheet serial numbers (epoch 1899-12-30, unit = days)
//! - Bikram Sambat strings (`2078/01/05`, `2078-1-5`)
//! - Gregorian strings in a handful of formats
//!
//! The parser disambiguates by value range and never fails hard: every
//! unparseable or implausible cell becomes an explicit missing value that
//! carries the rejection reason, so ingest can report why rows were dropped.

use chrono::{Datelike, Duration, NaiveDate};

mod bs;

pub use bs::{BS_YEAR_MAX, BS_YEAR_MIN, bs_days_in_month, bs_to_ad};

/// Serials below this are treated as non-Gregorian (typically BS-era) and
/// rejected rather than guessed. 40000 corresponds to mid-2009.
pub const MIN_PLAUSIBLE_SERIAL: f64 = 40000.0;

/// Accepted Gregorian year range for parsed dates.
pub const AD_YEAR_MIN: i32 = 1990;
pub const AD_YEAR_MAX: i32 = 2035;

const AD_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Which encoding a cell was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    ExcelSerial,
    BikramSambat,
    Gregorian,
}

/// Why a cell was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    Empty,
    /// Numeric cell below [`MIN_PLAUSIBLE_SERIAL`].
    ImplausibleSerial,
    /// Serial converts to a year outside the accepted Gregorian range.
    SerialYearOutOfRange,
    /// BS-shaped string with an invalid month or day.
    InvalidBsDate,
    /// Gregorian string with a year outside the accepted range.
    YearOutOfRange,
    Unparseable,
}

impl MissingReason {
    pub fn describe(self) -> &'static str {
        match self {
            MissingReason::Empty => "empty cell",
            MissingReason::ImplausibleSerial => "serial below plausibility floor",
            MissingReason::SerialYearOutOfRange => "serial outside Gregorian year range",
            MissingReason::InvalidBsDate => "invalid Bikram Sambat date",
            MissingReason::YearOutOfRange => "year outside accepted range",
            MissingReason::Unparseable => "unrecognized date format",
        }
    }
}

/// Outcome of parsing one raw cell. This is a status, not an error: callers
/// decide whether a missing date means skip, log, or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Parsed { date: NaiveDate, source: DateSource },
    Missing(MissingReason),
}

impl ParsedDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ParsedDate::Parsed { date, .. } => Some(*date),
            ParsedDate::Missing(_) => None,
        }
    }
}

/// Parse a raw cell that may be a spreadsheet serial, a BS string, or a
/// Gregorian string. Never errors.
pub fn parse_mixed_date(raw: &str) -> ParsedDate {
    let s = raw.trim().trim_start_matches('\u{feff}').trim();
    if s.is_empty() {
        return ParsedDate::Missing(MissingReason::Empty);
    }

    // Bare numbers are spreadsheet serials. Excel stores time-of-day as the
    // fractional part, so truncate toward zero.
    if let Ok(serial) = s.parse::<f64>() {
        return parse_serial(serial);
    }

    // BS strings share their shape with ISO dates; the year range decides.
    // Gregorian years up to 2035 never collide with BS years 2070-2090.
    if let Some((y, m, d)) = split_triplet(s) {
        if (BS_YEAR_MIN..=BS_YEAR_MAX).contains(&y) {
            return match bs_to_ad(y, m, d) {
                Some(date) => ParsedDate::Parsed {
                    date,
                    source: DateSource::BikramSambat,
                },
                None => ParsedDate::Missing(MissingReason::InvalidBsDate),
            };
        }
    }

    for fmt in AD_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if !(AD_YEAR_MIN..=AD_YEAR_MAX).contains(&date.year()) {
                return ParsedDate::Missing(MissingReason::YearOutOfRange);
            }
            return ParsedDate::Parsed {
                date,
                source: DateSource::Gregorian,
            };
        }
    }

    ParsedDate::Missing(MissingReason::Unparseable)
}

fn parse_serial(serial: f64) -> ParsedDate {
    if !serial.is_finite() || serial < MIN_PLAUSIBLE_SERIAL {
        return ParsedDate::Missing(MissingReason::ImplausibleSerial);
    }
    let Some(date) = serial_to_date(serial) else {
        return ParsedDate::Missing(MissingReason::Unparseable);
    };
    if !(AD_YEAR_MIN..=AD_YEAR_MAX).contains(&date.year()) {
        return ParsedDate::Missing(MissingReason::SerialYearOutOfRange);
    }
    ParsedDate::Parsed {
        date,
        source: DateSource::ExcelSerial,
    }
}

/// The 1899-12-30 spreadsheet epoch.
pub fn excel_epoch() -> NaiveDate {
    // Literal date, known valid.
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap()
}

/// Convert a spreadsheet serial to a date (no plausibility checks).
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let days = serial.trunc() as i64;
    excel_epoch().checked_add_signed(Duration::days(days))
}

/// Days since the 1899-12-30 epoch. Exact inverse of [`serial_to_date`] for
/// whole-day serials.
pub fn date_to_serial(date: NaiveDate) -> i64 {
    (date - excel_epoch()).num_days()
}

/// Split `Y[/-]M[/-]D` into integer parts. Mixed separators are accepted,
/// matching the historical scripts.
fn split_triplet(s: &str) -> Option<(i32, u32, u32)> {
    let parts: Vec<&str> = s.split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }
    let y: i32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let d: u32 = parts[2].parse().ok()?;
    Some((y, m, d))
}
