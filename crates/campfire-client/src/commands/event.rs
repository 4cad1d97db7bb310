//! Single-event lookup.

use campfire_core::{CalendarLink, EventRecord, OutputFormat, OutputFormatter};
use campfire_providers::EventService;
use tracing::debug;

use crate::actions;
use crate::cli::EventOutput;
use crate::error::ClientResult;

/// Renders a looked-up event for stdout.
pub fn render(
    record: &EventRecord,
    link: &CalendarLink,
    output: &EventOutput,
    formatter: &OutputFormatter,
) -> ClientResult<String> {
    if output.link_only {
        return Ok(link.to_string());
    }

    match output.output_format() {
        OutputFormat::Text => Ok(formatter.format_event_text(record, Some(link))),
        OutputFormat::Json => {
            let json = formatter.format_event_json(record, Some(link));
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}

/// Prints the event and runs the requested actions.
pub fn show(
    record: &EventRecord,
    link: &CalendarLink,
    output: &EventOutput,
    formatter: &OutputFormatter,
) -> ClientResult<()> {
    println!("{}", render(record, link, output, formatter)?);

    if output.open {
        actions::open_calendar_link(link)?;
    }
    if output.copy {
        actions::copy_calendar_link(link)?;
    }

    Ok(())
}

/// Looks up the event behind `link` and shows it.
pub async fn run(
    service: &EventService,
    link: &str,
    output: &EventOutput,
    formatter: &OutputFormatter,
) -> ClientResult<()> {
    let record = service.lookup(link).await?;
    debug!(title = %record.title, "event found");

    let calendar_link = service.calendar_link(&record);
    show(&record, &calendar_link, output, formatter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use campfire_core::NormalizerConfig;
    use campfire_providers::{RawEvent, StaticSource};

    const UUID: &str = "9f1c2e3a-4b5d-4e6f-8a7b-0c1d2e3f4a5b";

    async fn looked_up() -> (EventRecord, CalendarLink) {
        let source = StaticSource::new()
            .with_redirect(
                "https://cmpf.re/AbC123",
                format!("https://campfire.nianticlabs.com/discover/meetup/{}", UUID),
            )
            .with_events(
                UUID,
                vec![
                    RawEvent::new("Community Day")
                        .with_live_event_name("Raid Hour")
                        .with_time("2025-07-15T18:00:00Z")
                        .with_location("Hyde Park, London")
                        .with_members(["ACCEPTED", "CHECKED_IN"]),
                ],
            );
        let service = EventService::new(Box::new(source), NormalizerConfig::default());

        let record = service.lookup("https://cmpf.re/AbC123").await.unwrap();
        let link = service.calendar_link(&record);
        (record, link)
    }

    #[tokio::test]
    async fn link_only_prints_calendar_link() {
        let (record, link) = looked_up().await;
        let output = EventOutput {
            link_only: true,
            ..EventOutput::default()
        };

        let text = render(&record, &link, &output, &OutputFormatter::with_defaults()).unwrap();
        assert_eq!(text, link.as_str());
        assert!(text.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE"));
        assert!(text.contains("dates=20250715T180000Z%2F20250715T190000Z"));
    }

    #[tokio::test]
    async fn text_output_has_summary_and_link() {
        let (record, link) = looked_up().await;

        let text = render(
            &record,
            &link,
            &EventOutput::default(),
            &OutputFormatter::with_defaults(),
        )
        .unwrap();
        assert!(text.starts_with("Raid Hour\n"));
        assert!(text.contains("Hyde Park, London"));
        assert!(text.contains("Tue 15 Jul 2025, 19:00 - 20:00"));
        assert!(text.contains(link.as_str()));
        assert!(text.ends_with("2 going"));
    }

    #[tokio::test]
    async fn json_output_parses() {
        let (record, link) = looked_up().await;
        let output = EventOutput {
            json: true,
            ..EventOutput::default()
        };

        let text = render(&record, &link, &output, &OutputFormatter::with_defaults()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["title"], "Raid Hour");
        assert_eq!(value["attendee_count"], 2);
        assert_eq!(value["identifier"], UUID);
        assert_eq!(value["calendar_link"], link.as_str());
    }
}
