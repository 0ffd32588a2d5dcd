//! Bikram Sambat → Gregorian conversion.
//!
//! The BS calendar has variable month lengths that follow no closed formula,
//! so conversion is table-driven: month lengths per year, anchored at a known
//! new-year date. The table covers the years seen in NEPSE exports.

use chrono::{Duration, NaiveDate};

/// First BS year covered by the table.
pub const BS_YEAR_MIN: i32 = 2070;
/// Last BS year covered by the table.
pub const BS_YEAR_MAX: i32 = 2090;

/// 2070-01-01 BS = 2013-04-14 AD.
const EPOCH_AD: (i32, u32, u32) = (2013, 4, 14);

/// Days in each BS month for years 2070..=2090.
const MONTH_DAYS: [[u32; 12]; 21] = [
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 2070
    [31, 31, 32, 31, 31, 31, 29, 30, 30, 29, 30, 30], // 2071
    [31, 32, 31, 32, 31, 30, 30, 29, 30, 29, 30, 30], // 2072
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 31], // 2073
    [31, 31, 31, 32, 31, 31, 29, 30, 30, 29, 30, 30], // 2074
    [31, 31, 32, 31, 31, 31, 29, 30, 30, 29, 30, 30], // 2075
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 2076
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 31], // 2077
    [31, 31, 31, 32, 31, 31, 30, 29, 30, 29, 30, 30], // 2078
    [31, 31, 32, 31, 31, 31, 30, 29, 30, 29, 30, 30], // 2079
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 29, 30, 30], // 2080
    [31, 31, 32, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2081
    [31, 32, 31, 32, 31, 30, 30, 30, 29, 30, 29, 30], // 2082
    [31, 31, 32, 31, 31, 30, 30, 30, 29, 30, 30, 30], // 2083
    [31, 31, 32, 31, 31, 30, 30, 30, 29, 30, 30, 30], // 2084
    [31, 32, 31, 32, 30, 31, 30, 30, 29, 30, 30, 30], // 2085
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2086
    [31, 31, 32, 31, 31, 31, 30, 30, 29, 30, 30, 30], // 2087
    [30, 31, 32, 32, 30, 31, 30, 30, 29, 30, 30, 30], // 2088
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2089
    [30, 32, 31, 32, 31, 30, 30, 30, 29, 30, 30, 30], // 2090
];

fn epoch_ad() -> NaiveDate {
    // Literal date, known valid.
    let (y, m, d) = EPOCH_AD;
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Days in the given BS month, or `None` when year/month is out of table.
pub fn bs_days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(BS_YEAR_MIN..=BS_YEAR_MAX).contains(&year) || !(1..=12).contains(&month) {
        return None;
    }
    let row = &MONTH_DAYS[(year - BS_YEAR_MIN) as usize];
    Some(row[(month - 1) as usize])
}

/// Convert a BS date to Gregorian. `None` when the date is outside the table
/// or the day exceeds the month length.
pub fn bs_to_ad(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let month_len = bs_days_in_month(year, month)?;
    if day == 0 || day > month_len {
        return None;
    }

    let mut days: i64 = 0;
    for y in BS_YEAR_MIN..year {
        let row = &MONTH_DAYS[(y - BS_YEAR_MIN) as usize];
        days += row.iter().map(|&d| d as i64).sum::<i64>();
    }
    let row = &MONTH_DAYS[(year - BS_YEAR_MIN) as usize];
    for m in 0..(month - 1) as usize {
        days += row[m] as i64;
    }
    days += (day - 1) as i64;

    epoch_ad().checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_year_anchors_match_known_dates() {
        // Baisakh 1 anchors, verifiable against any BS/AD converter.
        let anchors = [
            (2070, ymd(2013, 4, 14)),
            (2071, ymd(2014, 4, 14)),
            (2072, ymd(2015, 4, 14)),
            (2073, ymd(2016, 4, 13)),
            (2074, ymd(2017, 4, 14)),
            (2075, ymd(2018, 4, 14)),
            (2076, ymd(2019, 4, 14)),
            (2077, ymd(2020, 4, 13)),
            (2078, ymd(2021, 4, 14)),
            (2079, ymd(2022, 4, 14)),
            (2080, ymd(2023, 4, 14)),
            (2081, ymd(2024, 4, 13)),
            (2082, ymd(2025, 4, 14)),
        ];
        for (bs_year, ad) in anchors {
            assert_eq!(bs_to_ad(bs_year, 1, 1), Some(ad), "BS {bs_year}-01-01");
        }
    }

    #[test]
    fn mid_month_offsets() {
        // 2078-01-05 = 2021-04-14 + 4 days.
        assert_eq!(bs_to_ad(2078, 1, 5), Some(ymd(2021, 4, 18)));
        // Last day of 2080 Chaitra is the day before 2081 new year.
        assert_eq!(bs_to_ad(2080, 12, 30), Some(ymd(2024, 4, 12)));
    }

    #[test]
    fn rejects_out_of_table_and_invalid_days() {
        assert_eq!(bs_to_ad(2069, 1, 1), None);
        assert_eq!(bs_to_ad(2091, 1, 1), None);
        assert_eq!(bs_to_ad(2078, 0, 1), None);
        assert_eq!(bs_to_ad(2078, 13, 1), None);
        assert_eq!(bs_to_ad(2078, 1, 0), None);
        // Baisakh 2078 has 31 days.
        assert_eq!(bs_days_in_month(2078, 1), Some(31));
        assert_eq!(bs_to_ad(2078, 1, 32), None);
    }

    #[test]
    fn months_are_contiguous() {
        // The first day of month m+1 is one day after the last day of month m.
        for year in BS_YEAR_MIN..=BS_YEAR_MAX {
            for month in 1..12 {
                let last = bs_days_in_month(year, month).unwrap();
                let end = bs_to_ad(year, month, last).unwrap();
                let next = bs_to_ad(year, month + 1, 1).unwrap();
                assert_eq!(next - end, Duration::days(1), "BS {year}-{month}");
            }
        }
    }
}
