//! Event-marker CSV ingest.
//!
//! Events are dated annotations (cabinet changes, policy announcements)
//! rendered as vertical markers on charts. The file is a two-column CSV with
//! `date,label`; dates go through the same mixed-calendar parser as the
//! sector table, so BS dates and Excel serials work here too.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::calendar::{ParsedDate, parse_mixed_date};
use crate::domain::EventMarker;
use crate::error::AppError;
use crate::io::ingest::RowError;

#[derive(Debug, Clone)]
pub struct LoadedEvents {
    /// Markers sorted by date.
    pub events: Vec<EventMarker>,
    pub row_errors: Vec<RowError>,
}

pub fn load_events(path: &Path) -> Result<LoadedEvents, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open events CSV '{}': {e}", path.display()))
    })?;
    read_events(file)
}

pub fn read_events<R: Read>(reader: R) -> Result<LoadedEvents, AppError> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut events = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, record) in csv.records().enumerate() {
        let line = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let raw_date = record.get(0).unwrap_or("");
        let date = match parse_mixed_date(raw_date) {
            ParsedDate::Parsed { date, .. } => date,
            ParsedDate::Missing(reason) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Dropped event: date '{raw_date}' ({}).", reason.describe()),
                });
                continue;
            }
        };
        let label = record.get(1).unwrap_or("").to_string();
        if label.is_empty() {
            row_errors.push(RowError {
                line,
                message: "Dropped event: empty label.".to_string(),
            });
            continue;
        }
        events.push(EventMarker { date, label });
    }

    events.sort_by_key(|e| e.date);
    Ok(LoadedEvents { events, row_errors })
}
