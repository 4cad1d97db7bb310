//! Link parsing and calendar-add link construction.
//!
//! This module provides functionality to:
//! - Parse user-supplied event links, with or without a scheme
//! - Extract the event identifier from `/meetup/<id>` paths
//! - Find UUID-shaped tokens anywhere in a URL
//! - Build calendar-add links from event records
//!
//! # Example
//!
//! ```
//! use campfire_core::links::{find_uuid, meetup_path_id};
//!
//! let link = "https://campfire.nianticlabs.com/discover/meetup/9f1c2e3a-4b5d-4e6f-8a7b-0c1d2e3f4a5b";
//! assert_eq!(
//!     meetup_path_id(link).as_deref(),
//!     Some("9f1c2e3a-4b5d-4e6f-8a7b-0c1d2e3f4a5b")
//! );
//! assert!(find_uuid(link).is_some());
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::event::{EventRecord, ListedEvent};

/// Calendar service the template link points at.
pub const DEFAULT_CALENDAR_BASE: &str = "https://calendar.google.com/calendar/render";

/// Path segment that precedes the event identifier in full meetup links.
const MEETUP_SEGMENT: &str = "meetup";

/// Regex for 36-character UUID-shaped tokens (8-4-4-4-12 hex groups).
static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}")
        .expect("Invalid UUID regex")
});

/// Regex for links typed without a scheme (`host.tld/path`).
static SCHEMELESS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+(/|$)").expect("Invalid scheme-less regex")
});

/// Parses a user-supplied link.
///
/// Links without a scheme (`cmpf.re/AbC123`) are retried with `https://`.
/// Returns `None` for anything that is not an http(s) URL.
pub fn parse_link(link: &str) -> Option<Url> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let parsed = match Url::parse(link) {
        Ok(url) => url,
        Err(_) if SCHEMELESS_REGEX.is_match(link) => Url::parse(&format!("https://{}", link)).ok()?,
        Err(_) => return None,
    };

    matches!(parsed.scheme(), "http" | "https").then_some(parsed)
}

/// Returns the identifier from a `/meetup/<id>` style link.
///
/// The path must contain a segment equal to `meetup` followed by at least
/// one more segment; the identifier is the final non-empty segment.
pub fn meetup_path_id(link: &str) -> Option<String> {
    let url = parse_link(link)?;
    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();

    let meetup_pos = segments.iter().position(|s| *s == MEETUP_SEGMENT)?;
    if meetup_pos + 1 >= segments.len() {
        return None;
    }

    segments.last().map(|s| s.to_string())
}

/// Finds the first UUID-shaped token anywhere in `text`.
pub fn find_uuid(text: &str) -> Option<String> {
    UUID_REGEX.find(text).map(|m| m.as_str().to_string())
}

/// Returns `true` if the link's host is one of `hosts` (case-insensitive,
/// `www.` prefix ignored).
pub fn is_shortlink(link: &str, hosts: &[String]) -> bool {
    let Some(url) = parse_link(link) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_start_matches("www.");
    hosts
        .iter()
        .any(|h| h.trim_start_matches("www.").eq_ignore_ascii_case(host))
}

/// A calendar-add link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarLink(String);

impl CalendarLink {
    /// Returns the link as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the link and returns the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CalendarLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CalendarLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds calendar-add links in the calendar service's template format.
///
/// Building never fails: empty fields are passed through as empty values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarLinkBuilder {
    base_url: String,
}

impl Default for CalendarLinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CALENDAR_BASE)
    }
}

impl CalendarLinkBuilder {
    /// Creates a builder targeting `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the link for a normalized event.
    pub fn build(&self, record: &EventRecord) -> CalendarLink {
        self.build_from_parts(
            &record.title,
            &record.description,
            &record.location,
            &record.span.compact_utc_range(),
        )
    }

    /// Builds the link for a listed event, or `None` when its time is unknown.
    pub fn build_for_listed(&self, event: &ListedEvent) -> Option<CalendarLink> {
        let span = event.span.as_ref()?;
        Some(self.build_from_parts(
            &event.title,
            &event.source_url,
            &event.location,
            &span.compact_utc_range(),
        ))
    }

    /// Builds a link from raw field values.
    ///
    /// `dates` is the `<startUTC>/<endUTC>` range in compact basic format.
    pub fn build_from_parts(
        &self,
        title: &str,
        details: &str,
        location: &str,
        dates: &str,
    ) -> CalendarLink {
        let mut link = self.base_url.clone();
        link.push(if self.base_url.contains('?') { '&' } else { '?' });
        link.push_str("action=TEMPLATE");

        for (key, value) in [
            ("text", title),
            ("details", details),
            ("location", location),
            ("dates", dates),
        ] {
            link.push('&');
            link.push_str(key);
            link.push('=');
            link.push_str(&urlencoding::encode(value));
        }

        CalendarLink(link)
    }
}
