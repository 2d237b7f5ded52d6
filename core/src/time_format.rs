//! Relative-age labels and timestamp parsing.

use crate::error::{Error, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::fmt::Display;

pub const JUST_NOW: &str = "Just Now";

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-ish timestamp.
///
/// Accepts RFC 3339 (`2024-03-05T14:07:00Z`, `+02:00` offsets) and naive
/// date-times without an offset, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(Error::InvalidTimestamp(raw.to_string()))
}

/// Coarse relative age of `t` as seen at `now`: `Just Now`, `5m`, `3h`,
/// `2d`, `1w`, `4mo`, `2y`.
///
/// Every bucket is floor division of the elapsed time. A week is 7 days, a
/// month 30 days and a year 365 days. Timestamps in the future (clock skew)
/// read as `Just Now`. The month and year buckets deliberately depart from
/// plain floor division so they never show a zero count: 28-29 days is
/// `1mo` and 360-364 days is `1y`.
pub fn relative_age(t: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - t).num_seconds();
    if seconds < MINUTE {
        return JUST_NOW.to_string();
    }
    if seconds < HOUR {
        return format!("{}m", seconds / MINUTE);
    }
    if seconds < DAY {
        return format!("{}h", seconds / HOUR);
    }

    let days = seconds / DAY;
    if days < 7 {
        return format!("{}d", days);
    }
    let weeks = days / 7;
    if weeks < 4 {
        return format!("{}w", weeks);
    }
    let months = (days / 30).max(1);
    if months < 12 {
        return format!("{}mo", months);
    }
    format!("{}y", (days / 365).max(1))
}

/// [`relative_age`] over a raw wire timestamp.
pub fn relative_age_str(raw: &str, now: DateTime<Utc>) -> Result<String> {
    Ok(relative_age(parse_timestamp(raw)?, now))
}

/// Date and time in the local timezone, as shown in the message detail drawer.
pub fn format_date_time(t: DateTime<Utc>) -> String {
    format_date_time_in(t, &Local)
}

pub fn format_date_time_in<Tz>(t: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    t.with_timezone(tz).format("%b %-d, %Y %H:%M").to_string()
}

/// Serde adapters for wire timestamps, see [`parse_timestamp`].
pub mod lenient {
    use super::parse_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use super::parse_timestamp;
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            t: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match t {
                Some(t) => s.serialize_some(&t.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) if !raw.trim().is_empty() => {
                    parse_timestamp(&raw).map(Some).map_err(de::Error::custom)
                }
                _ => Ok(None),
            }
        }
    }
}
