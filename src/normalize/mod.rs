//! Header canonicalization and base-100 rebasing.

pub mod headers;
pub mod rebase;

pub use headers::{HeaderKind, canonicalize_header, fold_header, sector_from_name};
pub use rebase::{BASE_VALUE, rebase_table};
