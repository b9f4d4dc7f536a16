//! Local wall-clock parsing and formatting.
//!
//! Session start times carry no timezone. They are stored as minute-precision
//! `NaiveDateTime` values and rendered as `YYYY-MM-DDTHH:mm`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{ScheduleError, ScheduleResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

const ACCEPTED_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a local date-time, dropping any seconds so the value matches its rendering.
pub fn parse_local_datetime(input: &str) -> Option<NaiveDateTime> {
    let trimmed = input.trim();
    ACCEPTED_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(truncate_to_minute)
}

pub fn format_local_datetime(value: NaiveDateTime) -> String {
    value.format(LOCAL_DATETIME_FORMAT).to_string()
}

pub fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(value)
}

/// Parse the anchor date of a full regeneration.
///
/// Accepts a bare `YYYY-MM-DD` or any date-time string whose first ten
/// characters are such a date; the time part is ignored.
pub fn parse_start_date(input: &str) -> ScheduleResult<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    let has_time_part = trimmed.len() > 10
        && trimmed.is_char_boundary(10)
        && matches!(trimmed.as_bytes()[10], b'T' | b't' | b' ');
    if has_time_part {
        if let Ok(date) = NaiveDate::parse_from_str(&trimmed[..10], DATE_FORMAT) {
            return Ok(date);
        }
    }
    Err(ScheduleError::invalid_start_date(input))
}

/// Parse an `HH:MM` or `HH:MM:SS` time of day.
pub fn parse_time_of_day(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
        .and_then(|t| t.with_second(0))
}

pub fn format_time_of_day(value: NaiveTime) -> String {
    value.format(TIME_OF_DAY_FORMAT).to_string()
}

/// Serde adapter for optional `YYYY-MM-DDTHH:mm` fields.
pub mod local_minute_opt {
    use chrono::NaiveDateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&super::format_local_datetime(*dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => super::parse_local_datetime(&text)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid start_at '{text}'"))),
        }
    }
}
