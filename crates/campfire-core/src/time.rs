//! Time handling for Campfire events.
//!
//! This module provides [`EventSpan`] for an event's start/end pair, the
//! timestamp parser used for upstream `time` fields, and the two renderings
//! every consumer needs: a wall-clock display string in a configured
//! timezone and the compact UTC form used by calendar links.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Compact UTC basic format used in calendar-add links.
pub const COMPACT_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Errors that can occur while parsing an event timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    /// The timestamp field was missing or blank.
    #[error("event time is missing")]
    Missing,

    /// The timestamp could not be parsed.
    #[error("invalid event time {value:?}")]
    Invalid { value: String },

    /// The wall-clock time does not exist in the target timezone.
    #[error("local time {value} does not exist in {timezone}")]
    NonexistentLocal { value: String, timezone: String },
}

/// Parses an upstream ISO-8601 timestamp into UTC.
///
/// RFC 3339 timestamps (including a `Z` suffix) are converted using their
/// offset. Timestamps without any offset are taken as UTC.
pub fn parse_event_time(raw: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TimeParseError::Missing);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(TimeParseError::Invalid {
        value: value.to_string(),
    })
}

/// Interprets a wall-clock time in `tz` and converts it to UTC.
///
/// Ambiguous times (the repeated hour when clocks go back) resolve to the
/// earlier instant.
pub fn local_to_utc(naive: NaiveDateTime, tz: &Tz) -> Result<DateTime<Utc>, TimeParseError> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimeParseError::NonexistentLocal {
            value: naive.to_string(),
            timezone: tz.name().to_string(),
        })
}

/// Returns `true` if `format` is a `strftime` string chrono can render.
pub fn is_valid_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Formats a UTC instant as wall-clock time in `tz`.
///
/// An unrenderable `format` falls back to RFC 3339 in `tz`.
pub fn format_local(dt: DateTime<Utc>, tz: &Tz, format: &str) -> String {
    let local = dt.with_timezone(tz);
    let mut out = String::new();
    if is_valid_format(format) && write!(out, "{}", local.format(format)).is_ok() {
        out
    } else {
        local.to_rfc3339()
    }
}

/// Formats a UTC instant in compact basic form (`YYYYMMDDTHHMMSSZ`).
pub fn format_compact_utc(dt: DateTime<Utc>) -> String {
    dt.format(COMPACT_UTC_FORMAT).to_string()
}

/// The start and end of an event.
///
/// Invariant: `start <= end`. When the source has no usable end time, the
/// end is derived from the start and an assumed duration and
/// `end_derived` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    end_derived: bool,
}

impl EventSpan {
    /// Creates a span from a start, an optional explicit end and the
    /// duration assumed when the end is missing.
    ///
    /// An explicit end earlier than the start is discarded in favour of the
    /// derived end.
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>, assumed: Duration) -> Self {
        match end {
            Some(end) if end >= start => Self {
                start,
                end,
                end_derived: false,
            },
            _ => Self::derived(start, assumed),
        }
    }

    /// Creates a span whose end is `start + assumed`, saturating at the
    /// latest representable instant.
    pub fn derived(start: DateTime<Utc>, assumed: Duration) -> Self {
        let assumed = if assumed < Duration::zero() {
            Duration::zero()
        } else {
            assumed
        };
        Self {
            start,
            end: start
                .checked_add_signed(assumed)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            end_derived: true,
        }
    }

    /// Returns the start instant.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the end instant.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `true` if the end was derived rather than provided.
    pub fn is_end_derived(&self) -> bool {
        self.end_derived
    }

    /// Returns the span length.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns the `<start>/<end>` compact UTC range for calendar links.
    pub fn compact_utc_range(&self) -> String {
        format!(
            "{}/{}",
            format_compact_utc(self.start),
            format_compact_utc(self.end)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::Europe::London;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn parses_z_suffix_as_utc() {
            let dt = parse_event_time("2025-09-10T09:00:00Z").unwrap();
            assert_eq!(dt, utc(2025, 9, 10, 9, 0, 0));
        }

        #[test]
        fn parses_explicit_offset() {
            let dt = parse_event_time("2025-09-10T10:00:00+01:00").unwrap();
            assert_eq!(dt, utc(2025, 9, 10, 9, 0, 0));
        }

        #[test]
        fn parses_fractional_seconds() {
            let dt = parse_event_time("2025-09-10T09:00:00.123Z").unwrap();
            assert_eq!(dt.timestamp(), utc(2025, 9, 10, 9, 0, 0).timestamp());
        }

        #[test]
        fn naive_timestamp_is_utc() {
            let dt = parse_event_time("2025-09-10T09:00:00").unwrap();
            assert_eq!(dt, utc(2025, 9, 10, 9, 0, 0));
        }

        #[test]
        fn blank_is_missing() {
            assert_eq!(parse_event_time(""), Err(TimeParseError::Missing));
            assert_eq!(parse_event_time("   "), Err(TimeParseError::Missing));
        }

        #[test]
        fn garbage_is_invalid() {
            let err = parse_event_time("next tuesday").unwrap_err();
            assert_eq!(
                err,
                TimeParseError::Invalid {
                    value: "next tuesday".to_string()
                }
            );
        }
    }

    mod display {
        use super::*;

        const FORMAT: &str = "%a %d %b %Y, %H:%M";

        #[test]
        fn summer_time_is_bst() {
            let dt = parse_event_time("2025-07-15T18:00:00Z").unwrap();
            assert_eq!(format_local(dt, &London, FORMAT), "Tue 15 Jul 2025, 19:00");
        }

        #[test]
        fn winter_time_is_gmt() {
            let dt = parse_event_time("2025-01-15T18:00:00Z").unwrap();
            assert_eq!(format_local(dt, &London, FORMAT), "Wed 15 Jan 2025, 18:00");
        }

        #[test]
        fn invalid_format_falls_back_to_rfc3339() {
            let dt = parse_event_time("2025-07-15T18:00:00Z").unwrap();
            assert!(!is_valid_format("%Q"));
            assert_eq!(format_local(dt, &London, "%Q"), "2025-07-15T19:00:00+01:00");
        }

        #[test]
        fn valid_formats_are_accepted() {
            assert!(is_valid_format(FORMAT));
            assert!(is_valid_format("%H:%M"));
            assert!(is_valid_format("no placeholders"));
        }

        #[test]
        fn compact_utc() {
            assert_eq!(
                format_compact_utc(utc(2025, 9, 10, 9, 5, 7)),
                "20250910T090507Z"
            );
        }

        #[test]
        fn local_to_utc_handles_bst() {
            let naive = NaiveDate::from_ymd_opt(2025, 7, 15)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap();
            assert_eq!(local_to_utc(naive, &London).unwrap(), utc(2025, 7, 15, 18, 0, 0));
        }

        #[test]
        fn local_to_utc_rejects_spring_forward_gap() {
            let naive = NaiveDate::from_ymd_opt(2025, 3, 30)
                .unwrap()
                .and_hms_opt(1, 30, 0)
                .unwrap();
            assert!(matches!(
                local_to_utc(naive, &London),
                Err(TimeParseError::NonexistentLocal { .. })
            ));
        }
    }

    mod span {
        use super::*;

        #[test]
        fn missing_end_is_start_plus_assumed() {
            let start = utc(2025, 9, 10, 9, 0, 0);
            let span = EventSpan::new(start, None, Duration::hours(1));
            assert_eq!(span.end(), utc(2025, 9, 10, 10, 0, 0));
            assert!(span.is_end_derived());
            assert_eq!(span.duration(), Duration::hours(1));
        }

        #[test]
        fn explicit_end_is_kept() {
            let start = utc(2025, 9, 10, 9, 0, 0);
            let end = utc(2025, 9, 10, 12, 30, 0);
            let span = EventSpan::new(start, Some(end), Duration::hours(1));
            assert_eq!(span.end(), end);
            assert!(!span.is_end_derived());
        }

        #[test]
        fn end_before_start_is_replaced() {
            let start = utc(2025, 9, 10, 9, 0, 0);
            let end = utc(2025, 9, 10, 8, 0, 0);
            let span = EventSpan::new(start, Some(end), Duration::hours(1));
            assert!(span.start() <= span.end());
            assert_eq!(span.end(), utc(2025, 9, 10, 10, 0, 0));
        }

        #[test]
        fn negative_assumed_duration_is_clamped() {
            let start = utc(2025, 9, 10, 9, 0, 0);
            let span = EventSpan::derived(start, Duration::hours(-2));
            assert_eq!(span.start(), span.end());
        }

        #[test]
        fn huge_assumed_duration_saturates() {
            let start = utc(2025, 9, 10, 9, 0, 0);
            let span = EventSpan::derived(start, Duration::MAX);
            assert_eq!(span.end(), DateTime::<Utc>::MAX_UTC);
            assert!(span.start() <= span.end());
        }

        #[test]
        fn compact_range() {
            let span = EventSpan::new(utc(2025, 9, 10, 9, 0, 0), None, Duration::hours(1));
            assert_eq!(span.compact_utc_range(), "20250910T090000Z/20250910T100000Z");
        }
    }
}
