//! Per-request orchestration.
//!
//! [`EventService`] ties a [`Resolver`], an [`EventSource`] and the
//! normalizer together. Nothing is cached between calls.

use campfire_core::{
    CalendarLink, CalendarLinkBuilder, EventIdentifier, EventRecord, ListedEvent,
    NormalizerConfig, parse_link,
};
use tracing::{debug, info};

use crate::campfire::ApiConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::normalize::{normalize_event, normalize_listing};
use crate::resolver::Resolver;
use crate::scrape::scrape_event;
use crate::source::EventSource;

/// Looks up Campfire events and builds calendar links for them.
pub struct EventService {
    source: Box<dyn EventSource>,
    resolver: Resolver,
    normalizer: NormalizerConfig,
    import_before_fetch: bool,
    link_builder: CalendarLinkBuilder,
}

impl EventService {
    /// Creates a service with the default resolver and no import step.
    pub fn new(source: Box<dyn EventSource>, normalizer: NormalizerConfig) -> Self {
        Self {
            source,
            resolver: Resolver::default(),
            normalizer,
            import_before_fetch: false,
            link_builder: CalendarLinkBuilder::default(),
        }
    }

    /// Creates a service configured from `api`.
    pub fn from_config(
        source: Box<dyn EventSource>,
        api: &ApiConfig,
        normalizer: NormalizerConfig,
    ) -> Self {
        Self::new(source, normalizer)
            .with_resolver(Resolver::from_config(api))
            .with_import_before_fetch(api.import_before_fetch)
            .with_link_builder(CalendarLinkBuilder::new(api.calendar_base.clone()))
    }

    /// Replaces the resolver.
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Enables or disables the import step before fetching.
    pub fn with_import_before_fetch(mut self, import: bool) -> Self {
        self.import_before_fetch = import;
        self
    }

    /// Replaces the calendar link builder.
    pub fn with_link_builder(mut self, builder: CalendarLinkBuilder) -> Self {
        self.link_builder = builder;
        self
    }

    /// Returns the normalizer configuration.
    pub fn normalizer(&self) -> &NormalizerConfig {
        &self.normalizer
    }

    /// Returns the name of the underlying source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Resolves a link and fetches the event it points at.
    pub async fn lookup(&self, link: &str) -> ProviderResult<EventRecord> {
        let identifier = self.resolver.resolve(link, self.source.as_ref()).await?;
        self.fetch(identifier).await
    }

    /// Fetches and normalizes the event for an identifier.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the upstream returns no event.
    pub async fn fetch(&self, identifier: EventIdentifier) -> ProviderResult<EventRecord> {
        if self.import_before_fetch {
            self.source.import_event(&identifier).await?;
            info!("imported event {}", identifier);
        }

        let events = self.source.fetch_events(&identifier).await?;
        let Some(raw) = events.first() else {
            return Err(ProviderError::not_found(format!(
                "no event data for {}",
                identifier
            )));
        };
        if events.len() > 1 {
            debug!(
                "{} events returned for {}, using the first",
                events.len(),
                identifier
            );
        }

        normalize_event(raw, &self.normalizer, Some(identifier))
    }

    /// Fetches an event page and scrapes it.
    pub async fn scrape(&self, url: &str) -> ProviderResult<EventRecord> {
        let url = parse_link(url).ok_or_else(|| {
            ProviderError::resolution(format!("not a web link: {:?}", url.trim()))
        })?;

        let page = self.source.fetch_page(url.as_str()).await?;
        scrape_event(&page.body, &page.final_url, &self.normalizer)
    }

    /// Lists a club's events, sorted by time.
    pub async fn list_events(&self, club_id: &str) -> ProviderResult<Vec<ListedEvent>> {
        let club_id = self.resolver.resolve_club(club_id)?;
        let raw_events = self.source.fetch_club_events(&club_id).await?;
        Ok(normalize_listing(raw_events, &self.normalizer))
    }

    /// Builds the calendar-add link for a record.
    pub fn calendar_link(&self, record: &EventRecord) -> CalendarLink {
        self.link_builder.build(record)
    }

    /// Builds the calendar-add link for a listing entry with a known time.
    pub fn calendar_link_for_listed(&self, event: &ListedEvent) -> Option<CalendarLink> {
        self.link_builder.build_for_listed(event)
    }
}
