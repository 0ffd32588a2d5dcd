//! Data acquisition: the exchange API fetcher and the synthetic sample
//! generator.

pub mod fetch;
pub mod sample;
