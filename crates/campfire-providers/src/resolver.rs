//! Link to event identifier resolution.
//!
//! A [`Resolver`] tries its [`ResolveStrategy`] list in order and returns
//! the first identifier produced. The default order is meetup path,
//! shortlink redirect, passthrough.

use campfire_core::{
    EventIdentifier, IdentifierOrigin, find_uuid, is_shortlink, meetup_path_id, parse_link,
};
use tracing::{debug, warn};

use crate::campfire::ApiConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::source::EventSource;

/// One way of deriving an identifier from a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Trailing segment of a `/meetup/<id>` path.
    MeetupPath,
    /// Follow a shortlink and inspect the final URL.
    Shortlink,
    /// Hand the trimmed input to the API unchanged.
    Passthrough,
}

impl ResolveStrategy {
    /// The default order.
    pub const DEFAULT_ORDER: [ResolveStrategy; 3] =
        [Self::MeetupPath, Self::Shortlink, Self::Passthrough];
}

/// Maps user-supplied links to event identifiers.
#[derive(Debug, Clone)]
pub struct Resolver {
    strategies: Vec<ResolveStrategy>,
    shortlink_hosts: Vec<String>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(vec![ApiConfig::DEFAULT_SHORTLINK_HOST.to_string()])
    }
}

impl Resolver {
    /// Creates a resolver with the default strategy order.
    pub fn new(shortlink_hosts: Vec<String>) -> Self {
        Self {
            strategies: ResolveStrategy::DEFAULT_ORDER.to_vec(),
            shortlink_hosts,
        }
    }

    /// Creates a resolver using the configured shortlink hosts.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.shortlink_hosts.clone())
    }

    /// Replaces the strategy list.
    pub fn with_strategies(mut self, strategies: Vec<ResolveStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Returns the strategies in the order they are tried.
    pub fn strategies(&self) -> &[ResolveStrategy] {
        &self.strategies
    }

    /// Resolves a link or token to an event identifier.
    ///
    /// # Errors
    ///
    /// Returns a resolution error for blank input, for a shortlink whose
    /// final URL carries no identifier, or when no strategy applies.
    pub async fn resolve(
        &self,
        link: &str,
        source: &dyn EventSource,
    ) -> ProviderResult<EventIdentifier> {
        let link = link.trim();
        if link.is_empty() {
            return Err(ProviderError::resolution("no link given"));
        }

        for strategy in &self.strategies {
            let resolved = match strategy {
                ResolveStrategy::MeetupPath => meetup_path_id(link)
                    .map(|id| EventIdentifier::new(id, IdentifierOrigin::MeetupPath)),
                ResolveStrategy::Shortlink => self.resolve_shortlink(link, source).await?,
                ResolveStrategy::Passthrough => {
                    Some(EventIdentifier::new(link, IdentifierOrigin::Passthrough))
                }
            };

            if let Some(identifier) = resolved {
                debug!(
                    "resolved {} to {} via {}",
                    link,
                    identifier,
                    identifier.origin().as_str()
                );
                return Ok(identifier);
            }
        }

        Err(ProviderError::resolution(format!(
            "unrecognized event link: {}",
            link
        )))
    }

    /// Resolves a club identifier.
    pub fn resolve_club(&self, club_id: &str) -> ProviderResult<String> {
        let club_id = club_id.trim();
        if club_id.is_empty() {
            return Err(ProviderError::resolution("no club identifier given"));
        }
        Ok(club_id.to_string())
    }

    /// `Ok(None)` when the link is not a shortlink.
    async fn resolve_shortlink(
        &self,
        link: &str,
        source: &dyn EventSource,
    ) -> ProviderResult<Option<EventIdentifier>> {
        if !is_shortlink(link, &self.shortlink_hosts) {
            return Ok(None);
        }
        let Some(url) = parse_link(link) else {
            return Ok(None);
        };

        let final_url = match source.follow_redirects(url.as_str()).await {
            Ok(final_url) => final_url,
            Err(e) => {
                warn!("could not follow {}, using it as-is: {}", link, e);
                return Ok(Some(EventIdentifier::new(link, IdentifierOrigin::Degraded)));
            }
        };

        meetup_path_id(&final_url)
            .or_else(|| find_uuid(&final_url))
            .map(|id| Some(EventIdentifier::new(id, IdentifierOrigin::Redirect)))
            .ok_or_else(|| {
                ProviderError::resolution(format!(
                    "no event identifier in {} (from {})",
                    final_url, link
                ))
            })
    }
}
