//! File input/output: CSV ingest, event markers, JSON summaries, exports.

pub mod broker;
pub mod events;
pub mod export;
pub mod ingest;
pub mod summary;
