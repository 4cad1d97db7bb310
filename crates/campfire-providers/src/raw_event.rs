//! Raw event shape returned by the Campfire tools API.
//!
//! [`RawEvent`] mirrors the JSON objects returned by the events and clubs
//! endpoints before normalization. Every field is optional: the upstream
//! omits or nulls fields freely, and normalization decides which absences
//! are fatal.

use campfire_core::{RsvpStatus, count_attending};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A club member's RSVP entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMember {
    /// Wire status such as `ACCEPTED` or `CHECKED_IN`.
    #[serde(default)]
    pub rsvp_status: Option<String>,
}

impl RawMember {
    /// Creates a member with the given wire status.
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            rsvp_status: Some(status.into()),
        }
    }

    /// Returns the parsed status, if any.
    pub fn status(&self) -> Option<RsvpStatus> {
        self.rsvp_status.as_deref().map(RsvpStatus::from_wire)
    }
}

/// An event as returned by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub campfire_live_event_name: Option<String>,
    pub description: Option<String>,
    /// ISO-8601 start time.
    #[serde(deserialize_with = "lenient_time")]
    pub time: Option<String>,
    /// ISO-8601 end time, rarely present.
    #[serde(deserialize_with = "lenient_time")]
    pub end_time: Option<String>,
    /// Either a plain string or an object with `name`/`address`.
    pub location: Option<Value>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub club_id: Option<String>,
    pub members: Option<Vec<RawMember>>,
}

impl RawEvent {
    /// Creates an empty event with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Builder method to set the start time.
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Builder method to set the end time.
    pub fn with_end_time(mut self, time: impl Into<String>) -> Self {
        self.end_time = Some(time.into());
        self
    }

    /// Builder method to set the live event name.
    pub fn with_live_event_name(mut self, name: impl Into<String>) -> Self {
        self.campfire_live_event_name = Some(name.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set a plain-string location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(Value::String(location.into()));
        self
    }

    /// Builder method to set the event URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Builder method to set the club identifier.
    pub fn with_club_id(mut self, club_id: impl Into<String>) -> Self {
        self.club_id = Some(club_id.into());
        self
    }

    /// Builder method to set members by wire status.
    pub fn with_members<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = Some(statuses.into_iter().map(RawMember::with_status).collect());
        self
    }

    /// Counts members who accepted or checked in.
    pub fn attendee_count(&self) -> u32 {
        let statuses: Vec<RsvpStatus> = self
            .members
            .iter()
            .flatten()
            .filter_map(RawMember::status)
            .collect();
        count_attending(&statuses)
    }

    /// Returns the location as text.
    ///
    /// A string is used as-is; an object contributes its `name`, else its
    /// `address`. Blank values count as absent.
    pub fn location_text(&self) -> Option<String> {
        match self.location.as_ref()? {
            Value::String(s) => non_blank(s),
            Value::Object(map) => ["name", "address"]
                .iter()
                .filter_map(|key| map.get(*key).and_then(Value::as_str))
                .find_map(non_blank),
            _ => None,
        }
    }

    /// Returns the start time string, empty when missing.
    pub fn time_or_empty(&self) -> &str {
        self.time.as_deref().unwrap_or("")
    }
}

/// Accepts any JSON value for a time field. Non-strings keep their JSON
/// text so they fail time parsing per event instead of failing the payload.
fn lenient_time<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Returns the trimmed field when it has content.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
