//! Event types for Campfire meetups.
//!
//! This module provides the core types shared by every crate:
//! - [`EventIdentifier`]: a resolved upstream event identifier
//! - [`RsvpStatus`]: a member's attendance state
//! - [`EventRecord`]: a normalized, display-ready event
//! - [`ListedEvent`]: one entry of a club's event listing

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::time::{EventSpan, format_local};

/// How an [`EventIdentifier`] was derived from the user's link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierOrigin {
    /// Trailing segment of a `/meetup/<id>` path.
    MeetupPath,
    /// Extracted from the final URL after following a shortlink.
    Redirect,
    /// The raw input, passed through for the upstream API to judge.
    Passthrough,
    /// The raw input, used because following a shortlink failed.
    Degraded,
}

impl IdentifierOrigin {
    /// Returns a short name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MeetupPath => "meetup_path",
            Self::Redirect => "redirect",
            Self::Passthrough => "passthrough",
            Self::Degraded => "degraded",
        }
    }
}

/// A token referencing one event upstream (a UUID, a shortlink slug or a
/// full link the API accepts).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventIdentifier {
    value: String,
    origin: IdentifierOrigin,
}

impl EventIdentifier {
    /// Creates a new identifier.
    pub fn new(value: impl Into<String>, origin: IdentifierOrigin) -> Self {
        Self {
            value: value.into(),
            origin,
        }
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns how the identifier was derived.
    pub fn origin(&self) -> IdentifierOrigin {
        self.origin
    }

    /// Returns `true` if the identifier is a fallback after a failed redirect.
    pub fn is_degraded(&self) -> bool {
        self.origin == IdentifierOrigin::Degraded
    }
}

impl fmt::Display for EventIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A member's RSVP state as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RsvpStatus {
    /// `ACCEPTED`
    Accepted,
    /// `CHECKED_IN`
    CheckedIn,
    /// Any other status, kept verbatim.
    Other(String),
}

impl RsvpStatus {
    /// Maps an upstream status string. Matching is exact and case-sensitive.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "ACCEPTED" => Self::Accepted,
            "CHECKED_IN" => Self::CheckedIn,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns `true` if this status counts toward attendance.
    pub fn is_attending(&self) -> bool {
        matches!(self, Self::Accepted | Self::CheckedIn)
    }
}

/// Counts statuses that count toward attendance.
pub fn count_attending<'a, I>(statuses: I) -> u32
where
    I: IntoIterator<Item = &'a RsvpStatus>,
{
    let count = statuses.into_iter().filter(|s| s.is_attending()).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// A normalized Campfire event.
///
/// Times are stored in UTC inside an [`EventSpan`] together with the
/// timezone used for display.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Display title.
    pub title: String,
    /// Assembled description; API events end it with the attendee line.
    pub description: String,
    /// Location text (or a surrogate such as the event URL).
    pub location: String,
    /// Start and end.
    pub span: EventSpan,
    /// Timezone used for display.
    pub timezone: Tz,
    /// Members who accepted or checked in.
    pub attendee_count: u32,
    /// Canonical event URL (may be empty).
    pub source_url: String,
    /// Owning club, if known.
    pub club_id: Option<String>,
    /// Cover image URL, if any.
    pub image_url: Option<String>,
    /// The live event this meetup belongs to, if any.
    pub live_event_name: Option<String>,
    /// The identifier the record was fetched with.
    pub identifier: Option<EventIdentifier>,
}

impl EventRecord {
    /// Creates a record with the required fields; optional fields are empty.
    pub fn new(title: impl Into<String>, span: EventSpan, timezone: Tz) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            location: String::new(),
            span,
            timezone,
            attendee_count: 0,
            source_url: String::new(),
            club_id: None,
            image_url: None,
            live_event_name: None,
            identifier: None,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the attendee count.
    pub fn with_attendee_count(mut self, count: u32) -> Self {
        self.attendee_count = count;
        self
    }

    /// Builder method to set the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Builder method to set the club identifier.
    pub fn with_club_id(mut self, club_id: impl Into<String>) -> Self {
        self.club_id = Some(club_id.into());
        self
    }

    /// Builder method to set the image URL.
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Builder method to set the live event name.
    pub fn with_live_event_name(mut self, name: impl Into<String>) -> Self {
        self.live_event_name = Some(name.into());
        self
    }

    /// Builder method to set the identifier.
    pub fn with_identifier(mut self, identifier: EventIdentifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Start in UTC.
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.span.start()
    }

    /// End in UTC.
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.span.end()
    }

    /// Start in the display timezone.
    pub fn start_local(&self) -> DateTime<Tz> {
        self.span.start().with_timezone(&self.timezone)
    }

    /// End in the display timezone.
    pub fn end_local(&self) -> DateTime<Tz> {
        self.span.end().with_timezone(&self.timezone)
    }

    /// Formats the start in the display timezone.
    pub fn display_start(&self, format: &str) -> String {
        format_local(self.span.start(), &self.timezone, format)
    }

    /// Formats the end in the display timezone.
    pub fn display_end(&self, format: &str) -> String {
        format_local(self.span.end(), &self.timezone, format)
    }
}

/// One event of a club listing.
///
/// Unlike [`EventRecord`], the time may be unknown: a malformed time on a
/// single event must not fail the whole listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedEvent {
    /// Display title.
    pub title: String,
    /// Location text.
    pub location: String,
    /// Canonical event URL (may be empty).
    pub source_url: String,
    /// Members who accepted or checked in.
    pub attendee_count: u32,
    /// Owning club, if known.
    pub club_id: Option<String>,
    /// The time string as received (empty when missing); the sort key.
    pub raw_time: String,
    /// Parsed start/end, `None` when the time is missing or malformed.
    pub span: Option<EventSpan>,
    /// Formatted start, or the unknown-time placeholder.
    pub display_time: String,
}

impl ListedEvent {
    /// Returns `true` if the event's time could be parsed.
    pub fn has_time(&self) -> bool {
        self.span.is_some()
    }
}
