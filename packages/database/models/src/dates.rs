//! Date parsing and formatting shared by storage, filters and the API.
//!
//! Timestamps are stored as RFC 3339 strings with millisecond precision and
//! a `Z` suffix, so lexical order in `SQLite` equals chronological order.
//! That only holds for four-digit years, so dates outside
//! [`MIN_YEAR`]..=[`MAX_YEAR`] are rejected on input.

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};

/// Earliest year representable in the storage form.
pub const MIN_YEAR: i32 = 0;

/// Latest year representable in the storage form.
pub const MAX_YEAR: i32 = 9999;

/// Parses a date or timestamp supplied by a client.
///
/// Accepts RFC 3339 (`2024-03-10T12:00:00Z`, any offset), a naive
/// timestamp (`2024-03-10T12:00:00`, taken as UTC) and a bare calendar
/// date (`2024-03-10`, taken as midnight UTC). Returns `None` when the UTC
/// year falls outside [`MIN_YEAR`]..=[`MAX_YEAR`].
#[must_use]
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    parse_any(s.trim()).filter(is_storable)
}

/// Returns `true` if `dt` has a four-digit UTC year and so survives a
/// round trip through [`format_timestamp`] and [`parse_date`].
#[must_use]
pub fn is_storable(dt: &DateTime<Utc>) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&dt.year())
}

fn parse_any(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats a timestamp in the canonical storage form.
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter accepting any form understood by [`parse_date`].
pub mod flexible {
    use super::{DateTime, Deserialize, Deserializer, Utc, parse_date};

    /// Deserializes a required timestamp.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error if the value is not a string or
    /// cannot be parsed as a date.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw:?}")))
    }

    /// Optional variant of [`deserialize`].
    pub mod option {
        use super::{DateTime, Deserialize, Deserializer, Utc, parse_date};

        /// Deserializes an optional timestamp. `null` and empty strings are
        /// treated as absent.
        ///
        /// # Errors
        ///
        /// Returns a deserialization error if a non-empty value cannot be
        /// parsed as a date.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => parse_date(s)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s:?}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_date_as_midnight_utc() {
        let dt = parse_date("2024-03-10").unwrap();
        assert_eq!(dt.to_string(), "2024-03-10 00:00:00 UTC");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_date("2024-03-10T01:30:00-07:00").unwrap();
        assert_eq!(dt.to_string(), "2024-03-10 08:30:00 UTC");
    }

    #[test]
    fn parses_naive_timestamp_as_utc() {
        let dt = parse_date("2024-03-10T14:30:00.250").unwrap();
        assert_eq!(format_timestamp(&dt), "2024-03-10T14:30:00.250Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("not-a-date").is_none());
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn rejects_years_without_four_digits() {
        assert!(parse_date("+10000-01-01").is_none());
        assert!(parse_date("-0001-01-01").is_none());
        assert!(parse_date("+10000-01-01T00:00:00.000Z").is_none());
        // Local date in range, but UTC lands in year 10000.
        assert!(parse_date("9999-12-31T23:00:00-05:00").is_none());
    }

    #[test]
    fn boundary_years_round_trip() {
        for raw in ["0000-01-01T00:00:00.000Z", "9999-12-31T23:59:59.999Z"] {
            let dt = parse_date(raw).unwrap();
            assert_eq!(format_timestamp(&dt), raw);
            assert_eq!(parse_date(&format_timestamp(&dt)), Some(dt));
        }
    }

    #[test]
    fn storage_format_sorts_chronologically() {
        let earlier = format_timestamp(&parse_date("2023-12-31T23:59:59Z").unwrap());
        let later = format_timestamp(&parse_date("2024-01-01").unwrap());
        assert!(earlier < later);
    }
}
