//! The string boundary.
//!
//! Every date, time, and date-time that enters the crate as text is parsed
//! here. The resolver itself only ever sees chrono values, so a malformed
//! string fails with [`CustodyError::InvalidDate`] or
//! [`CustodyError::InvalidTime`] before any schedule logic runs.
//!
//! All values are local wall-clock values. An RFC 3339 offset is accepted
//! on input but discarded: custody days are calendar days where the family
//! lives, not instants.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CustodyError;

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns [`CustodyError::InvalidDate`] if the string is not a valid date.
///
/// # Examples
///
/// ```
/// use custody_engine::parse::parse_date;
///
/// let date = parse_date("2024-02-29").unwrap();
/// assert_eq!(date.to_string(), "2024-02-29");
/// assert!(parse_date("2023-02-29").is_err());
/// ```
pub fn parse_date(s: &str) -> Result<NaiveDate, CustodyError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| CustodyError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse a 24-hour clock time: `"16:00"` or `"16:00:00"`.
///
/// # Errors
///
/// Returns [`CustodyError::InvalidTime`] if the string is not a time of day.
pub fn parse_time(s: &str) -> Result<NaiveTime, CustodyError> {
    parse_time_string(s).ok_or_else(|| CustodyError::InvalidTime(format!("'{}'", s)))
}

/// Parse a local date-time.
///
/// Accepts, in order:
/// - RFC 3339 (`2024-01-05T16:00:00+01:00`); the offset is dropped and the
///   wall-clock reading kept
/// - naive ISO 8601 (`2024-01-05T16:00:00`, `2024-01-05T16:00`,
///   `2024-01-05 16:00`)
/// - a bare date (`2024-01-05`), meaning midnight
///
/// # Errors
///
/// Returns [`CustodyError::InvalidDate`] if none of the forms match.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, CustodyError> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::default()))
        .map_err(|_| CustodyError::InvalidDate(format!("'{}': not a date or date-time", s)))
}

/// 24-hour clock time, with or without seconds.
fn parse_time_string(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Serde adapter for optional `HH:MM` clock times.
///
/// Deserializes anything [`parse_time`] accepts; serializes as `HH:MM`.
pub(crate) mod opt_clock_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_time(s).map(Some).map_err(de::Error::custom),
        }
    }
}
