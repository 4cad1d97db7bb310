//! Club listing.

use campfire_core::{CalendarLink, ListedEvent, OutputFormatter};
use campfire_providers::EventService;
use tracing::debug;

use crate::error::ClientResult;

/// Renders a club listing as text or JSON.
pub fn render(
    club_id: &str,
    events: &[ListedEvent],
    links: &[Option<CalendarLink>],
    json: bool,
    formatter: &OutputFormatter,
) -> ClientResult<String> {
    if json {
        let listing = formatter.format_listing_json(club_id, events, links);
        Ok(serde_json::to_string_pretty(&listing)?)
    } else {
        Ok(formatter.format_listing_text(events))
    }
}

/// Lists the club's events, earliest first.
pub async fn run(
    service: &EventService,
    club_id: &str,
    json: bool,
    formatter: &OutputFormatter,
) -> ClientResult<()> {
    let events = service.list_events(club_id).await?;
    debug!(count = events.len(), club = club_id, "club events fetched");

    let links: Vec<_> = events
        .iter()
        .map(|event| service.calendar_link_for_listed(event))
        .collect();

    println!("{}", render(club_id.trim(), &events, &links, json, formatter)?);
    Ok(())
}
