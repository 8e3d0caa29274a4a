// `/Date(<epoch-ms>)/` codec
//
// The server speaks the old ASP.NET JSON date form. An optional `±hhmm`
// suffix may follow the milliseconds; it only describes the sender's
// local zone, the epoch value itself is always UTC.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::Error;

const PREFIX: &str = "/Date(";
const SUFFIX: &str = ")/";

/// Parse a `/Date(ms)/` string into a UTC instant.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, Error> {
    let invalid = || Error::InvalidTimestamp(raw.to_owned());

    let inner = raw
        .trim()
        .strip_prefix(PREFIX)
        .and_then(|s| s.strip_suffix(SUFFIX))
        .ok_or_else(invalid)?;

    // Skip a leading sign, then cut at the zone offset if there is one.
    let digits_end = inner
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map_or(inner.len(), |(i, _)| i);
    let (millis, offset) = inner.split_at(digits_end);

    if !offset.is_empty() && !is_zone_offset(offset) {
        return Err(invalid());
    }

    let millis: i64 = millis.parse().map_err(|_| invalid())?;
    Utc.timestamp_millis_opt(millis).single().ok_or_else(invalid)
}

/// Format a UTC instant as `/Date(ms)/`.
pub fn format(at: DateTime<Utc>) -> String {
    format!("{PREFIX}{}{SUFFIX}", at.timestamp_millis())
}

fn is_zone_offset(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('+' | '-'))
        && chars.as_str().len() == 4
        && chars.all(|c| c.is_ascii_digit())
}
