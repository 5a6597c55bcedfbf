use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use super::TimerInputError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the timestamp shapes the billing API hands out.
///
/// RFC 3339 strings keep their offset. Offset-less strings are read as UTC
/// and bare digit strings as Unix epoch milliseconds.
pub fn parse_timestamp(raw: &str, field: &'static str) -> Result<DateTime<Utc>, TimerInputError> {
    let value = raw.trim();
    let invalid = || TimerInputError::InvalidTimestamp {
        field,
        value: raw.to_string(),
    };

    if value.is_empty() {
        return Err(invalid());
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<i64>()
            .ok()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .ok_or_else(invalid);
    }

    Err(invalid())
}
