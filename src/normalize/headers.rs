//! Column-header canonicalization.
//!
//! Sector-index exports produced at different times spell the same column a
//! dozen ways ("Banking Sub-Index", "banking subindex", "BANKING", ...). This
//! module folds every raw header with one deterministic policy and maps the
//! folded form onto the canonical [`Sector`] vocabulary.
//!
//! Fold policy: trim, strip a UTF-8 BOM, replace newlines with spaces,
//! collapse internal whitespace, ASCII-lowercase. The historical scripts kept
//! a few exact-case keys ("Nepse" vs "nepse"); the lowercase fold absorbs
//! both, so no mapping is lost.
//!
//! Unrecognized headers are neither guessed nor silently kept: the caller
//! receives [`HeaderKind::Unrecognized`] and decides how to report it.

use crate::domain::Sector;

/// What a raw header turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderKind {
    /// The date column.
    Date,
    /// A recognized sector-index column.
    Sector(Sector),
    /// Not in the mapping table; carries the folded form for reporting.
    Unrecognized(String),
}

/// Apply the fold policy to a raw header.
pub fn fold_header(raw: &str) -> String {
    let cleaned = raw.trim_start_matches('\u{feff}').replace(['\n', '\r'], " ");
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Map a raw header onto the canonical vocabulary.
pub fn canonicalize_header(raw: &str) -> HeaderKind {
    let folded = fold_header(raw);
    match folded.as_str() {
        "date" | "business_date" | "business date" => HeaderKind::Date,
        _ => match sector_for(&folded) {
            Some(sector) => HeaderKind::Sector(sector),
            None => HeaderKind::Unrecognized(folded),
        },
    }
}

/// Resolve a user-supplied sector name (e.g. a `--sectors` value) using the
/// same fold policy as headers.
pub fn sector_from_name(raw: &str) -> Option<Sector> {
    sector_for(&fold_header(raw))
}

/// The consolidated mapping table: every folded header spelling seen across
/// the historical file vintages, in one place.
fn sector_for(folded: &str) -> Option<Sector> {
    let sector = match folded {
        "banking" | "banking sub-index" | "banking subindex" | "com bank" | "com. bank"
        | "commercial bank" | "commercial banks" => Sector::Banking,

        "development bank" | "development bank index" | "development banks" | "dev.bank" => {
            Sector::DevelopmentBank
        }

        "finance" | "finance index" => Sector::Finance,

        "float" | "float index" => Sector::Float,

        "hotel" | "hotels" | "hotels index" | "hotels and tourism" | "hotels and tourism index" => {
            Sector::HotelsTourism
        }

        "hydro power" | "hydropower" | "hydropower index" => Sector::HydroPower,

        "investment" | "investment index" => Sector::Investment,

        "life insurance" | "life insurance index" => Sector::LifeInsurance,

        "manufacturing" | "manufact" | "manufacturing and processing"
        | "manufacturing and processing index" => Sector::Manufacturing,

        "microfinance" | "microfinance index" | "micro-finance" | "micro finance" => {
            Sector::Microfinance
        }

        "mutual fund" | "mutual fund index" => Sector::MutualFund,

        "nepse" | "nepse index" => Sector::Nepse,

        "non life insurance" | "non-life insurance" | "non-life insurance index" => {
            Sector::NonLifeInsurance
        }

        "others" | "others index" | "other index" => Sector::Others,

        "sensitive" | "sensitive index" => Sector::Sensitive,

        "sensitive float" | "sensitive float index" => Sector::SensitiveFloat,

        "trading" | "trading index" | "tradings" => Sector::Trading,

        _ => return None,
    };
    Some(sector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_collapses_whitespace_and_case() {
        assert_eq!(fold_header("  Banking\nSub-Index  "), "banking sub-index");
        assert_eq!(fold_header("HYDRO   POWER"), "hydro power");
        assert_eq!(fold_header("\u{feff}Date"), "date");
    }

    #[test]
    fn date_column_spellings() {
        assert_eq!(canonicalize_header("Date"), HeaderKind::Date);
        assert_eq!(canonicalize_header("BUSINESS_DATE"), HeaderKind::Date);
        assert_eq!(canonicalize_header("business date"), HeaderKind::Date);
    }

    #[test]
    fn every_vintage_spelling_maps() {
        let cases = [
            ("Banking SubIndex", Sector::Banking),
            ("Com. Bank", Sector::Banking),
            ("COMMERCIAL BANKS", Sector::Banking),
            ("Hotels And Tourism Index", Sector::HotelsTourism),
            ("Hotel", Sector::HotelsTourism),
            ("Hydropower Index", Sector::HydroPower),
            ("Dev.Bank", Sector::DevelopmentBank),
            ("Manufacturing And Processing", Sector::Manufacturing),
            ("Manufact", Sector::Manufacturing),
            ("Micro-Finance", Sector::Microfinance),
            ("Non Life Insurance", Sector::NonLifeInsurance),
            ("Nepse", Sector::Nepse),
            ("NEPSE Index", Sector::Nepse),
            ("Sensitive Float Index", Sector::SensitiveFloat),
            ("TRADINGS", Sector::Trading),
            ("Mutual Fund", Sector::MutualFund),
            ("Investment Index", Sector::Investment),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                canonicalize_header(raw),
                HeaderKind::Sector(expected),
                "header {raw:?}"
            );
        }
    }

    #[test]
    fn unknown_headers_are_flagged_not_guessed() {
        // Bare "Insurance" is ambiguous between life and non-life.
        assert_eq!(
            canonicalize_header("Insurance"),
            HeaderKind::Unrecognized("insurance".to_string())
        );
        assert_eq!(
            canonicalize_header("Turnover (Rs)"),
            HeaderKind::Unrecognized("turnover (rs)".to_string())
        );
    }

    #[test]
    fn sector_from_name_uses_same_fold() {
        assert_eq!(sector_from_name("  hydro power "), Some(Sector::HydroPower));
        assert_eq!(sector_from_name("NEPSE"), Some(Sector::Nepse));
        assert_eq!(sector_from_name("nope"), None);
    }
}
