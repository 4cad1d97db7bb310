//! Event page scraping.

use campfire_core::OutputFormatter;
use campfire_providers::EventService;
use tracing::debug;

use crate::cli::EventOutput;
use crate::commands::event;
use crate::error::ClientResult;

/// Scrapes the event page at `url` and shows it like a looked-up event.
pub async fn run(
    service: &EventService,
    url: &str,
    output: &EventOutput,
    formatter: &OutputFormatter,
) -> ClientResult<()> {
    let record = service.scrape(url).await?;
    debug!(title = %record.title, url = %record.source_url, "event page scraped");

    let calendar_link = service.calendar_link(&record);
    event::show(&record, &calendar_link, output, formatter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use campfire_core::NormalizerConfig;
    use campfire_providers::StaticSource;

    const PAGE_URL: &str = "https://campfire.example/events/1";

    fn service() -> EventService {
        let source = StaticSource::new().with_page(
            PAGE_URL,
            "<html><body><h2>Raid Hour</h2><p>Bring potions.</p>\
             <div>July 15, 2025 7:00 PM – 9:00 PM</div></body></html>",
        );
        EventService::new(Box::new(source), NormalizerConfig::default())
    }

    #[tokio::test]
    async fn scraped_event_renders_link() {
        let service = service();
        let record = service.scrape(PAGE_URL).await.unwrap();
        let link = service.calendar_link(&record);

        let output = EventOutput {
            link_only: true,
            ..EventOutput::default()
        };
        let text =
            event::render(&record, &link, &output, &OutputFormatter::with_defaults()).unwrap();
        assert!(text.contains("text=Raid%20Hour"));
        assert!(text.contains("dates=20250715T180000Z%2F20250715T200000Z"));
    }

    #[tokio::test]
    async fn missing_page_is_reported() {
        let err = run(
            &service(),
            "https://campfire.example/events/404",
            &EventOutput::default(),
            &OutputFormatter::with_defaults(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Provider(_)));
        assert!(err.to_string().starts_with("Couldn't process link:"));
    }
}
