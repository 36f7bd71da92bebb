//! Roster loading: turns the birthday CSV into validated `(name, date)` rows.

use crate::config::Config;
use crate::error::{Error, ImportResult};
use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::ops::RangeInclusive;
use tracing::{debug, info};

/// Marker pandas-style exports write for missing cells
const MISSING_MARKER: &str = "nan";

/// Years `%Y` may produce
const FOUR_DIGIT_YEARS: RangeInclusive<i32> = 1000..=9999;

/// One name and birth date taken from the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub name: String,
    pub birth_date: NaiveDate,
}

/// Load the roster file named in the config
pub fn load_roster(config: &Config) -> ImportResult<Vec<RosterRow>> {
    let path = &config.input_path;
    if !path.exists() {
        return Err(Error::FileNotFound(path.clone()));
    }

    info!("Loading roster from {}", path.display());
    let file = File::open(path)?;
    read_roster(file, config)
}

/// Read roster rows from any CSV source, in source order
pub fn read_roster<R: Read>(source: R, config: &Config) -> ImportResult<Vec<RosterRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let found: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let column_index = |column: &str| -> ImportResult<usize> {
        found
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| Error::Schema {
                column: column.to_string(),
                found: found.clone(),
            })
    };
    let name_idx = column_index(&config.name_column)?;
    let date_idx = column_index(&config.date_column)?;

    let mut rows = Vec::new();
    let mut blank = 0usize;
    for record in reader.records() {
        let record = record?;
        let name = record.get(name_idx).unwrap_or_default().trim();
        let raw_date = record.get(date_idx).unwrap_or_default().trim();

        if is_missing(name) || is_missing(raw_date) {
            blank += 1;
            continue;
        }

        let birth_date = parse_birth_date(raw_date, &config.date_format).map_err(|reason| {
            Error::DateParse {
                name: name.to_string(),
                value: raw_date.to_string(),
                format: config.date_format.clone(),
                reason,
            }
        })?;

        rows.push(RosterRow {
            name: name.to_string(),
            birth_date,
        });
    }

    debug!("Dropped {} blank roster rows", blank);
    info!("Loaded {} roster rows", rows.len());
    Ok(rows)
}

/// Parse a birthday with the configured format.
///
/// chrono's `%Y` takes any number of digits, so a four-digit year is
/// enforced separately: `12/10/95` must not become year 95.
fn parse_birth_date(raw: &str, format: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(raw, format).map_err(|e| e.to_string())?;
    if format.contains("%Y") && !FOUR_DIGIT_YEARS.contains(&date.year()) {
        return Err(format!("year {} is not four digits", date.year()));
    }
    Ok(date)
}

/// Empty or the stringified-missing marker, compared case-insensitively.
///
/// Narrower than a pandas export's null spellings: `N/A`, `NA`, `None`,
/// `null` and `#N/A` are ordinary values here, so in the date column they
/// fail the parse instead of skipping the row.
fn is_missing(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case(MISSING_MARKER)
}
