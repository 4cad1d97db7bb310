//! RawEvent to EventRecord conversion pipeline.
//!
//! This module shapes upstream [`RawEvent`] data into the display-ready
//! [`EventRecord`] and, for club listings, [`ListedEvent`].
//!
//! The normalization process:
//! 1. Picks the title (live event name, then name, then the fallback)
//! 2. Parses the start and the optional end into an [`EventSpan`]
//! 3. Counts attendees and assembles the description
//! 4. Picks the location (location text, then event URL, then the fallback)

use campfire_core::{
    EventIdentifier, EventRecord, EventSpan, ListedEvent, NormalizerConfig, format_local,
    parse_event_time,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::ProviderResult;
use crate::raw_event::{RawEvent, non_blank};

/// Separator between the description and a secondary event name.
const NAME_SEPARATOR: &str = " — ";

/// Converts a [`RawEvent`] to an [`EventRecord`].
///
/// # Errors
///
/// Returns a parse error if the start time is missing or malformed. A
/// malformed or inverted end time is not an error: the end is derived from
/// the assumed duration instead.
pub fn normalize_event(
    raw: &RawEvent,
    config: &NormalizerConfig,
    identifier: Option<EventIdentifier>,
) -> ProviderResult<EventRecord> {
    let title = resolve_title(raw, config);
    let span = parse_span(raw, config)?;
    let attendee_count = raw.attendee_count();

    let mut record = EventRecord::new(&title, span, config.timezone)
        .with_description(build_description(raw, &title, attendee_count))
        .with_location(resolve_location(raw, config))
        .with_attendee_count(attendee_count)
        .with_source_url(source_url(raw));

    if let Some(club_id) = raw.club_id.as_deref().and_then(non_blank) {
        record = record.with_club_id(club_id);
    }

    if let Some(image) = raw.image.as_deref().and_then(non_blank) {
        record = record.with_image_url(image);
    }

    if let Some(live) = raw.campfire_live_event_name.as_deref().and_then(non_blank) {
        record = record.with_live_event_name(live);
    }

    if let Some(identifier) = identifier {
        record = record.with_identifier(identifier);
    }

    Ok(record)
}

/// Converts one entry of a club listing.
///
/// Never fails: a missing or malformed time leaves the span empty and the
/// display time set to the unknown-time placeholder.
pub fn normalize_listed(raw: &RawEvent, config: &NormalizerConfig) -> ListedEvent {
    let raw_time = raw.time_or_empty().to_string();

    let span = match parse_span(raw, config) {
        Ok(span) => Some(span),
        Err(e) => {
            debug!(
                "club event {:?} has no usable time: {}",
                raw.name.as_deref().unwrap_or_default(),
                e
            );
            None
        }
    };

    let display_time = span
        .map(|s| format_local(s.start(), &config.timezone, &config.display_format))
        .unwrap_or_else(|| config.unknown_time.clone());

    ListedEvent {
        title: resolve_title(raw, config),
        location: resolve_location(raw, config),
        source_url: source_url(raw),
        attendee_count: raw.attendee_count(),
        club_id: raw.club_id.as_deref().and_then(non_blank),
        raw_time,
        span,
        display_time,
    }
}

/// Sorts a club listing by raw time string and normalizes each entry.
///
/// A missing time sorts as the empty string, so it comes first. The sort is
/// stable: entries with equal times keep their upstream order.
pub fn normalize_listing(
    mut raw_events: Vec<RawEvent>,
    config: &NormalizerConfig,
) -> Vec<ListedEvent> {
    raw_events.sort_by(|a, b| a.time_or_empty().cmp(b.time_or_empty()));
    raw_events
        .iter()
        .map(|raw| normalize_listed(raw, config))
        .collect()
}

/// Live event name, then name, then the fallback title.
fn resolve_title(raw: &RawEvent, config: &NormalizerConfig) -> String {
    raw.campfire_live_event_name
        .as_deref()
        .and_then(non_blank)
        .or_else(|| raw.name.as_deref().and_then(non_blank))
        .unwrap_or_else(|| config.fallback_title.clone())
}

fn parse_span(raw: &RawEvent, config: &NormalizerConfig) -> ProviderResult<EventSpan> {
    let start = parse_event_time(raw.time_or_empty())?;
    let end = parse_end(raw, start);
    Ok(EventSpan::new(start, end, config.assumed_duration))
}

/// The explicit end, when present, parseable and not before `start`.
fn parse_end(raw: &RawEvent, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value = raw.end_time.as_deref().and_then(non_blank)?;
    match parse_event_time(&value) {
        Ok(end) if end >= start => Some(end),
        Ok(end) => {
            debug!("ignoring end {} before start {}", end, start);
            None
        }
        Err(e) => {
            debug!("ignoring end time: {}", e);
            None
        }
    }
}

/// Base description, the name when it differs from the title, then the
/// attendee line.
fn build_description(raw: &RawEvent, title: &str, attendee_count: u32) -> String {
    let mut text = raw
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if let Some(name) = raw.name.as_deref().and_then(non_blank) {
        if name != title {
            if !text.is_empty() {
                text.push_str(NAME_SEPARATOR);
            }
            text.push_str(&name);
        }
    }

    let going = format!("{} going", attendee_count);
    if text.is_empty() {
        going
    } else {
        format!("{}\n\n{}", text, going)
    }
}

fn resolve_location(raw: &RawEvent, config: &NormalizerConfig) -> String {
    raw.location_text()
        .or_else(|| raw.url.as_deref().and_then(non_blank))
        .unwrap_or_else(|| config.fallback_location.clone())
}

fn source_url(raw: &RawEvent) -> String {
    raw.url.as_deref().and_then(non_blank).unwrap_or_default()
}
