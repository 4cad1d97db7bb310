//! Output formatting for Campfire events.
//!
//! This module provides formatters for displaying events in two formats:
//! - **Text**: human-readable terminal output with optional hyperlinks
//! - **JSON**: machine-readable output
//!
//! # Example
//!
//! ```rust
//! use campfire_core::format::{FormatOptions, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(FormatOptions::default());
//! assert_eq!(formatter.format_listing_text(&[]), "No events found.");
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DISPLAY_FORMAT;
use crate::event::{EventRecord, ListedEvent};
use crate::links::CalendarLink;

/// Width of the label column in text output.
const LABEL_WIDTH: usize = 10;

/// The output format for event display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Configuration options for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// `strftime` format for displayed times.
    pub display_format: String,
    /// Maximum length for titles (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Whether to emit OSC8 hyperlinks for URLs.
    pub hyperlinks: bool,
    /// Text shown for an empty club listing.
    pub no_events_text: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
            max_title_length: None,
            hyperlinks: false,
            no_events_text: "No events found.".to_string(),
        }
    }
}

/// JSON output for a single event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    /// Start in the display timezone, RFC 3339.
    pub start: String,
    /// End in the display timezone, RFC 3339.
    pub end: String,
    pub display_start: String,
    pub display_end: String,
    pub end_derived: bool,
    pub timezone: String,
    pub attendee_count: u32,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_link: Option<String>,
}

/// JSON output for one entry of a club listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonListedEvent {
    pub title: String,
    pub location: String,
    pub source_url: String,
    pub attendee_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    /// The time as received, `None` when missing.
    pub time: Option<String>,
    pub display_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_link: Option<String>,
}

/// JSON output for a club listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonListing {
    pub club_id: String,
    pub events: Vec<JsonListedEvent>,
}

/// Formats events and listings.
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    /// Creates a formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Creates a formatter with default options.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Returns the options.
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Formats a single event as a text summary.
    pub fn format_event_text(
        &self,
        record: &EventRecord,
        calendar_link: Option<&CalendarLink>,
    ) -> String {
        let mut lines = vec![self.title(&record.title).into_owned()];

        lines.push(labeled("When:", &self.time_range(record)));
        lines.push(labeled("Where:", &record.location));
        lines.push(labeled("Going:", &record.attendee_count.to_string()));

        if !record.source_url.is_empty() {
            lines.push(labeled("Link:", &self.link(&record.source_url)));
        }

        if let Some(link) = calendar_link {
            lines.push(labeled("Calendar:", &self.link(link.as_str())));
        }

        if !record.description.is_empty() {
            lines.push(String::new());
            lines.push(record.description.clone());
        }

        lines.join("\n")
    }

    /// Formats a club listing as text, one event per line.
    pub fn format_listing_text(&self, events: &[ListedEvent]) -> String {
        if events.is_empty() {
            return self.options.no_events_text.clone();
        }

        events
            .iter()
            .map(|event| {
                format!(
                    "{} | {} | {} | {} going",
                    event.display_time,
                    self.title(&event.title),
                    event.location,
                    event.attendee_count
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Builds the JSON view of an event.
    pub fn format_event_json(
        &self,
        record: &EventRecord,
        calendar_link: Option<&CalendarLink>,
    ) -> JsonEvent {
        JsonEvent {
            title: record.title.clone(),
            description: record.description.clone(),
            location: record.location.clone(),
            start: record.start_local().to_rfc3339(),
            end: record.end_local().to_rfc3339(),
            display_start: record.display_start(&self.options.display_format),
            display_end: record.display_end(&self.options.display_format),
            end_derived: record.span.is_end_derived(),
            timezone: record.timezone.name().to_string(),
            attendee_count: record.attendee_count,
            source_url: record.source_url.clone(),
            club_id: record.club_id.clone(),
            image_url: record.image_url.clone(),
            live_event_name: record.live_event_name.clone(),
            identifier: record.identifier.as_ref().map(|id| id.as_str().to_string()),
            calendar_link: calendar_link.map(|l| l.as_str().to_string()),
        }
    }

    /// Builds the JSON view of a club listing.
    ///
    /// `calendar_links` is parallel to `events`.
    pub fn format_listing_json(
        &self,
        club_id: &str,
        events: &[ListedEvent],
        calendar_links: &[Option<CalendarLink>],
    ) -> JsonListing {
        let events = events
            .iter()
            .enumerate()
            .map(|(i, event)| JsonListedEvent {
                title: event.title.clone(),
                location: event.location.clone(),
                source_url: event.source_url.clone(),
                attendee_count: event.attendee_count,
                club_id: event.club_id.clone(),
                time: (!event.raw_time.is_empty()).then(|| event.raw_time.clone()),
                display_time: event.display_time.clone(),
                calendar_link: calendar_links
                    .get(i)
                    .and_then(|l| l.as_ref())
                    .map(|l| l.as_str().to_string()),
            })
            .collect();

        JsonListing {
            club_id: club_id.to_string(),
            events,
        }
    }

    fn title<'a>(&self, title: &'a str) -> Cow<'a, str> {
        match self.options.max_title_length {
            Some(max) => ellipsis(title, max),
            None => Cow::Borrowed(title),
        }
    }

    fn link(&self, url: &str) -> String {
        if self.options.hyperlinks {
            make_hyperlink(url, url)
        } else {
            url.to_string()
        }
    }

    /// Start and end; the end drops its date when both fall on the same day.
    fn time_range(&self, record: &EventRecord) -> String {
        let format = &self.options.display_format;
        let start = record.display_start(format);
        let end = if record.start_local().date_naive() == record.end_local().date_naive() {
            record.display_end("%H:%M")
        } else {
            record.display_end(format)
        };
        format!("{} - {}", start, end)
    }
}

fn labeled(label: &str, value: &str) -> String {
    format!("{:<width$}{}", label, value, width = LABEL_WIDTH)
}

/// Truncates a string to `max_len` characters, adding "..." if truncated.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

/// Creates an OSC8 hyperlink for terminal output.
pub fn make_hyperlink(url: &str, label: &str) -> String {
    // \e]8;;URL\e\\LABEL\e]8;;\e\\
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, label)
}
