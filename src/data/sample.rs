//! Synthetic sector-table generation.
//!
//! Produces a plausible multi-sector random walk so every subcommand can be
//! exercised without exchange data on disk. The same seed always yields the
//! same table.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{SampleConfig, Sector, SectorColumn, SectorTable};
use crate::error::AppError;

/// First trading date of the synthetic series.
const SAMPLE_START: (i32, u32, u32) = (2021, 4, 18);
/// Daily log-volatility of each synthetic sector walk.
const DAILY_VOL: f64 = 0.012;
/// Mild common upward drift so momentum has something to find.
const DAILY_DRIFT: f64 = 0.0004;
/// Fraction of cells blanked out to exercise missing-value handling.
const MISSING_PROB: f64 = 0.01;

/// Sectors included in the synthetic table (a realistic subset).
const SAMPLE_SECTORS: [Sector; 6] = [
    Sector::Banking,
    Sector::DevelopmentBank,
    Sector::Finance,
    Sector::HydroPower,
    Sector::LifeInsurance,
    Sector::Nepse,
];

pub fn generate_sample(config: &SampleConfig) -> Result<SectorTable, AppError> {
    if config.days == 0 {
        return Err(AppError::usage("Sample length must be > 0 days."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::external(format!("Noise distribution error: {e}")))?;

    let dates = trading_dates(config.days);

    // Each sector gets its own drift tilt so leaders actually rotate.
    let columns = SAMPLE_SECTORS
        .iter()
        .map(|&sector| {
            let tilt: f64 = rng.gen_range(-0.0004..0.0006);
            let mut level = 1000.0 + rng.gen_range(0.0..2000.0);
            let values = (0..config.days)
                .map(|_| {
                    let z: f64 = normal.sample(&mut rng);
                    level *= (DAILY_DRIFT + tilt + DAILY_VOL * z).exp();
                    if rng.r#gen::<f64>() < MISSING_PROB {
                        None
                    } else {
                        Some(level)
                    }
                })
                .collect();
            SectorColumn { sector, values }
        })
        .collect();

    Ok(SectorTable { dates, columns })
}

/// `count` consecutive trading dates from the fixed start, skipping the
/// Nepali weekend (Friday and Saturday).
fn trading_dates(count: usize) -> Vec<NaiveDate> {
    let (y, m, d) = SAMPLE_START;
    let mut date = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        if !matches!(date.weekday(), Weekday::Fri | Weekday::Sat) {
            out.push(date);
        }
        date += Duration::days(1);
    }
    out
}
