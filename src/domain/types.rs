//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during analysis
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical sector vocabulary.
///
/// Raw spreadsheet headers from every file vintage are folded onto this set by
/// the column normalizer. Variants are declared in alphabetical order of their
/// display name so the derived `Ord` doubles as the canonical ordering used to
/// break momentum ties deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sector {
    Banking,
    DevelopmentBank,
    Finance,
    Float,
    HotelsTourism,
    HydroPower,
    Investment,
    LifeInsurance,
    Manufacturing,
    Microfinance,
    MutualFund,
    Nepse,
    NonLifeInsurance,
    Others,
    Sensitive,
    SensitiveFloat,
    Trading,
}

impl Sector {
    pub const ALL: [Sector; 17] = [
        Sector::Banking,
        Sector::DevelopmentBank,
        Sector::Finance,
        Sector::Float,
        Sector::HotelsTourism,
        Sector::HydroPower,
        Sector::Investment,
        Sector::LifeInsurance,
        Sector::Manufacturing,
        Sector::Microfinance,
        Sector::MutualFund,
        Sector::Nepse,
        Sector::NonLifeInsurance,
        Sector::Others,
        Sector::Sensitive,
        Sector::SensitiveFloat,
        Sector::Trading,
    ];

    /// Human-readable label for terminal output and chart legends.
    pub fn display_name(self) -> &'static str {
        match self {
            Sector::Banking => "Banking",
            Sector::DevelopmentBank => "Development Bank",
            Sector::Finance => "Finance",
            Sector::Float => "Float",
            Sector::HotelsTourism => "Hotels and Tourism",
            Sector::HydroPower => "Hydro Power",
            Sector::Investment => "Investment",
            Sector::LifeInsurance => "Life Insurance",
            Sector::Manufacturing => "Manufacturing and Processing",
            Sector::Microfinance => "Microfinance",
            Sector::MutualFund => "Mutual Fund",
            Sector::Nepse => "NEPSE",
            Sector::NonLifeInsurance => "Non-Life Insurance",
            Sector::Others => "Others",
            Sector::Sensitive => "Sensitive",
            Sector::SensitiveFloat => "Sensitive Float",
            Sector::Trading => "Trading",
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One sector's values aligned to a shared date index.
///
/// `values[i]` is the observation on `dates[i]` of the owning table; `None`
/// marks an explicitly missing cell.
#[derive(Debug, Clone)]
pub struct SectorColumn {
    pub sector: Sector,
    pub values: Vec<Option<f64>>,
}

/// A date-indexed table of sector values.
///
/// Invariants (enforced by ingest / the sample generator):
/// - `dates` is sorted ascending and free of duplicates
/// - every column has exactly `dates.len()` values
/// - columns are sorted by canonical sector order
#[derive(Debug, Clone)]
pub struct SectorTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<SectorColumn>,
}

impl SectorTable {
    pub fn column(&self, sector: Sector) -> Option<&SectorColumn> {
        self.columns.iter().find(|c| c.sector == sector)
    }

    pub fn sectors(&self) -> Vec<Sector> {
        self.columns.iter().map(|c| c.sector).collect()
    }
}

/// Why a series was (or was not) rebased.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RebaseStatus {
    /// Values were divided by the anchor value and scaled to base 100.
    Rebased { anchor_value: f64 },
    /// Anchor value was missing; values passed through unchanged.
    MissingAnchor,
    /// Anchor value was exactly zero; values passed through unchanged.
    ZeroAnchor,
}

#[derive(Debug, Clone)]
pub struct RebasedColumn {
    pub sector: Sector,
    pub values: Vec<Option<f64>>,
    pub status: RebaseStatus,
}

/// A sector table rescaled so each series equals 100 at the anchor date
/// (except pass-through series, see [`RebaseStatus`]).
#[derive(Debug, Clone)]
pub struct RebasedTable {
    pub anchor: NaiveDate,
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<RebasedColumn>,
}

impl RebasedTable {
    pub fn column(&self, sector: Sector) -> Option<&RebasedColumn> {
        self.columns.iter().find(|c| c.sector == sector)
    }
}

/// A change of momentum leader.
///
/// `from` is `None` for the first date a leader becomes defined at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationPoint {
    pub date: NaiveDate,
    pub from: Option<Sector>,
    pub to: Sector,
}

/// One point on a simulated equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Headline statistics of a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_return_pct: f64,
    /// Largest peak-to-trough relative decline, as a negative percentage.
    pub max_drawdown_pct: f64,
    /// Annualized Sharpe ratio; `None` when the return std dev is zero.
    pub sharpe: Option<f64>,
    pub switches: usize,
    /// Number of simulated trading days (equity points after the start).
    pub days: usize,
}

/// Full output of a rotation backtest for one lookback window.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub lookback: usize,
    /// First date with a defined leader; the equity curve starts here at 1.0.
    pub start_date: NaiveDate,
    pub equity: Vec<EquityPoint>,
    pub rotations: Vec<RotationPoint>,
    pub summary: BacktestSummary,
}

/// A saved equity file (JSON) for later replotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityFile {
    pub tool: String,
    pub input: String,
    pub lookback: usize,
    pub cost_per_switch: f64,
    pub summary: BacktestSummary,
    pub equity: Vec<EquityPoint>,
    pub rotations: Vec<RotationPoint>,
}

/// A dated annotation drawn as a vertical marker on charts
/// (e.g., Finance Minister changes).
#[derive(Debug, Clone, PartialEq)]
pub struct EventMarker {
    pub date: NaiveDate,
    pub label: String,
}

/// Settings for the synthetic sample generator.
#[derive(Debug, Clone, Copy)]
pub struct SampleConfig {
    pub days: usize,
    pub seed: u64,
}

/// Where the sector table comes from.
#[derive(Debug, Clone)]
pub enum InputSource {
    File(PathBuf),
    Sample(SampleConfig),
}

impl InputSource {
    /// Short label used in reports and exports.
    pub fn label(&self) -> String {
        match self {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Sample(cfg) => format!("sample(seed={})", cfg.seed),
        }
    }
}

/// A full rotation run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RotateConfig {
    pub source: InputSource,
    /// Candidate momentum lookback windows (periods).
    pub windows: Vec<usize>,
    /// Fraction of equity paid on each leader switch (e.g. 0.005 = 50bp).
    pub cost_per_switch: f64,
    /// Rebase anchor date; `None` means the earliest date in the table.
    pub anchor: Option<NaiveDate>,
    /// Restrict the analysis to these sectors when set.
    pub sectors: Option<Vec<Sector>>,
    /// How many of the most recent rotations to print.
    pub top_rotations: usize,
}
