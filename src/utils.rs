use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::types::Session;

/// Fixed, locale-invariant pattern used for the timestamp round-trip.
pub const TIMESTAMP_PATTERN: &str = "%d-%m-%Y %H:%M";

pub const DEFAULT_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Years accepted both in literal date cells and in the configured year list.
pub const PLAUSIBLE_YEARS: RangeInclusive<i32> = 1900..=9999;

pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Reads a date cell: "oggi", "ieri" or a literal date. `None` if unparseable.
pub fn interpret_date_cell(text: &str, today: NaiveDate, formats: &[String]) -> Option<NaiveDate> {
    let trimmed = text.trim();
    match trimmed.to_lowercase().as_str() {
        "oggi" => Some(today),
        "ieri" => today.pred_opt(),
        _ => parse_literal_date(trimmed, formats),
    }
}

/// Parses a literal date. chrono's `%Y` also takes two-digit years ("24"),
/// so anything outside [`PLAUSIBLE_YEARS`] is rejected.
pub fn parse_literal_date(text: &str, formats: &[String]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| parse_italian_long_date(text))
        .filter(|date| PLAUSIBLE_YEARS.contains(&date.year()))
}

fn italian_month(name: &str) -> Option<u32> {
    let month = match name {
        "gennaio" | "gen" => 1,
        "febbraio" | "feb" => 2,
        "marzo" | "mar" => 3,
        "aprile" | "apr" => 4,
        "maggio" | "mag" => 5,
        "giugno" | "giu" => 6,
        "luglio" | "lug" => 7,
        "agosto" | "ago" => 8,
        "settembre" | "set" => 9,
        "ottobre" | "ott" => 10,
        "novembre" | "nov" => 11,
        "dicembre" | "dic" => 12,
        _ => return None,
    };
    Some(month)
}

/// "2 gennaio 2024", optionally preceded by a weekday ("martedì 2 gennaio 2024").
fn parse_italian_long_date(text: &str) -> Option<NaiveDate> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect();

    let [day, month, year] = match words.as_slice() {
        [day, month, year] => [*day, *month, *year],
        [_weekday, day, month, year] => [*day, *month, *year],
        _ => return None,
    };

    let day: u32 = day.parse().ok()?;
    let month = italian_month(month.trim_end_matches('.'))?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn draw_datetime(date: NaiveDate, draw_index: i64) -> NaiveDateTime {
    date.and_time(Session::from_draw_index(draw_index).time())
}

#[derive(Debug, PartialEq, Eq)]
pub enum TimestampError {
    BadFormat(String),
    Conversion(String),
}

/// Epoch seconds for a draw time, going through [`TIMESTAMP_PATTERN`].
///
/// A zero result is treated as a failed conversion.
pub fn to_unix_timestamp(datetime: NaiveDateTime, tz: Tz) -> Result<i64, TimestampError> {
    let formatted = datetime.format(TIMESTAMP_PATTERN).to_string();
    let parsed = NaiveDateTime::parse_from_str(&formatted, TIMESTAMP_PATTERN)
        .map_err(|_| TimestampError::BadFormat(formatted.clone()))?;

    let local = tz
        .from_local_datetime(&parsed)
        .earliest()
        .ok_or_else(|| TimestampError::Conversion(formatted.clone()))?;

    let timestamp = local.timestamp();
    if timestamp == 0 {
        return Err(TimestampError::Conversion(formatted));
    }
    Ok(timestamp)
}

pub fn parse_years(list: &str) -> Result<Vec<i32>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .ok()
                .filter(|y| PLAUSIBLE_YEARS.contains(y))
                .ok_or_else(|| format!("invalid year: {}", s))
        })
        .collect()
}

pub fn default_years() -> Vec<i32> {
    (2018..=2024).rev().collect()
}
