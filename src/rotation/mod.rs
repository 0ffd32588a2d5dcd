//! Sector rotation: momentum signals, leader selection, and backtesting.

pub mod backtest;
pub mod momentum;
pub mod selection;

pub use backtest::run_backtest;
pub use momentum::{leaders, pct_change, rotation_points};
pub use selection::{WindowSearch, search_windows};
