//! `nepse-rotate` library crate.
//!
//! The binary (`nrot`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., future GUI/daemon, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod calendar;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod normalize;
pub mod plot;
pub mod report;
pub mod rotation;
