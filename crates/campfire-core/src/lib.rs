//! Core types: event records, time handling, calendar links, formatting

pub mod config;
pub mod event;
pub mod format;
pub mod links;
pub mod time;
pub mod tracing;

pub use config::NormalizerConfig;
pub use event::{
    EventIdentifier, EventRecord, IdentifierOrigin, ListedEvent, RsvpStatus, count_attending,
};
pub use format::{
    FormatOptions, JsonEvent, JsonListedEvent, JsonListing, OutputFormat, OutputFormatter,
    ellipsis, make_hyperlink,
};
pub use links::{
    CalendarLink, CalendarLinkBuilder, find_uuid, is_shortlink, meetup_path_id, parse_link,
};
pub use time::{
    EventSpan, TimeParseError, format_compact_utc, format_local, is_valid_format, local_to_utc,
    parse_event_time,
};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
