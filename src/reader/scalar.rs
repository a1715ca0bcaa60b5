//! Parsing of typed scalars handed out as strings by a reader

use super::Field;
use crate::error::{Result, SdmxError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an XML-schema style boolean (`true`, `false`, `1`, `0`)
pub fn parse_bool(field: Field, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(malformed(field, raw, "boolean")),
    }
}

/// Parse a signed integer
pub fn parse_int(field: Field, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| malformed(field, raw, "integer"))
}

/// Parse a timestamp given as RFC 3339, a naive date-time or a plain date.
///
/// Values without an offset are taken to be UTC.
pub fn parse_timestamp(field: Field, raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| malformed(field, raw, "timestamp"))
}

fn malformed(field: Field, raw: &str, expected: &'static str) -> SdmxError {
    SdmxError::MalformedScalar {
        field,
        value: raw.to_string(),
        expected,
    }
}
