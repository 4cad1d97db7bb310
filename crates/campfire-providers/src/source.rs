//! EventSource trait definition.
//!
//! This module defines [`EventSource`], the seam between request handling
//! and upstream access. The HTTP implementation lives in
//! [`crate::campfire`]; [`StaticSource`] and [`ErrorSource`] serve tests and
//! degraded operation.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use campfire_core::EventIdentifier;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the service can hold a
/// `Box<dyn EventSource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fetched HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL after following redirects.
    pub final_url: String,
    /// Response body.
    pub body: String,
}

impl FetchedPage {
    /// Creates a new page.
    pub fn new(final_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            final_url: final_url.into(),
            body: body.into(),
        }
    }
}

/// Upstream access for Campfire events.
///
/// Implementations must be `Send + Sync`. Every call is a single attempt;
/// retries are not part of the contract.
pub trait EventSource: Send + Sync {
    /// Returns the name of this source (e.g. "campfire", "static").
    fn name(&self) -> &str;

    /// Asks the upstream to import an event before it is fetched.
    fn import_event<'a>(
        &'a self,
        identifier: &'a EventIdentifier,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Fetches the events matching an identifier. An empty vector means the
    /// upstream knows no such event.
    fn fetch_events<'a>(
        &'a self,
        identifier: &'a EventIdentifier,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>>;

    /// Fetches every event of a club, in upstream order.
    fn fetch_club_events<'a>(
        &'a self,
        club_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>>;

    /// Fetches a raw HTML page.
    fn fetch_page<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<FetchedPage>>;

    /// Follows redirects from `link` and returns the final URL.
    fn follow_redirects<'a>(&'a self, link: &'a str) -> BoxFuture<'a, ProviderResult<String>>;
}

/// An in-memory source backed by fixtures.
///
/// Unknown identifiers and clubs yield empty results, unknown links do not
/// redirect and unknown pages fail with an upstream error.
#[derive(Debug, Default)]
pub struct StaticSource {
    events: HashMap<String, Vec<RawEvent>>,
    clubs: HashMap<String, Vec<RawEvent>>,
    pages: HashMap<String, String>,
    redirects: HashMap<String, String>,
    unreachable: HashSet<String>,
    reject_imports: bool,
    imports: Mutex<Vec<String>>,
}

impl StaticSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register the events returned for an identifier.
    pub fn with_events(mut self, identifier: impl Into<String>, events: Vec<RawEvent>) -> Self {
        self.events.insert(identifier.into(), events);
        self
    }

    /// Builder method to register a club's events.
    pub fn with_club(mut self, club_id: impl Into<String>, events: Vec<RawEvent>) -> Self {
        self.clubs.insert(club_id.into(), events);
        self
    }

    /// Builder method to register an HTML page.
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Builder method to register a redirect.
    pub fn with_redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }

    /// Builder method to make a link fail as if the network were down.
    pub fn with_unreachable(mut self, link: impl Into<String>) -> Self {
        self.unreachable.insert(link.into());
        self
    }

    /// Builder method to make every import fail.
    pub fn with_rejected_imports(mut self) -> Self {
        self.reject_imports = true;
        self
    }

    /// Returns the identifiers imported so far, in call order.
    pub fn imported(&self) -> Vec<String> {
        self.imports
            .lock()
            .map(|imports| imports.clone())
            .unwrap_or_default()
    }

    fn check_reachable(&self, link: &str) -> ProviderResult<()> {
        if self.unreachable.contains(link) {
            return Err(ProviderError::upstream(format!(
                "connection failed: {}",
                link
            )));
        }
        Ok(())
    }
}

impl EventSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    fn import_event<'a>(
        &'a self,
        identifier: &'a EventIdentifier,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            if self.reject_imports {
                return Err(ProviderError::upstream(
                    "import failed (500 Internal Server Error)",
                ));
            }
            if let Ok(mut imports) = self.imports.lock() {
                imports.push(identifier.as_str().to_string());
            }
            Ok(())
        })
    }

    fn fetch_events<'a>(
        &'a self,
        identifier: &'a EventIdentifier,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            self.check_reachable(identifier.as_str())?;
            Ok(self
                .events
                .get(identifier.as_str())
                .cloned()
                .unwrap_or_default())
        })
    }

    fn fetch_club_events<'a>(
        &'a self,
        club_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            self.check_reachable(club_id)?;
            Ok(self.clubs.get(club_id).cloned().unwrap_or_default())
        })
    }

    fn fetch_page<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<FetchedPage>> {
        Box::pin(async move {
            self.check_reachable(url)?;
            let final_url = self
                .redirects
                .get(url)
                .cloned()
                .unwrap_or_else(|| url.to_string());
            match self.pages.get(&final_url) {
                Some(body) => Ok(FetchedPage::new(final_url, body.clone())),
                None => Err(ProviderError::upstream(format!(
                    "page request failed (404 Not Found): {}",
                    url
                ))),
            }
        })
    }

    fn follow_redirects<'a>(&'a self, link: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.check_reachable(link)?;
            Ok(self
                .redirects
                .get(link)
                .cloned()
                .unwrap_or_else(|| link.to_string()))
        })
    }
}

/// A source that always returns an error.
///
/// Useful for testing or as a placeholder when the HTTP client fails to
/// initialize.
#[derive(Debug)]
pub struct ErrorSource {
    error: ProviderError,
}

impl ErrorSource {
    /// Creates a new error source.
    pub fn new(error: ProviderError) -> Self {
        Self { error }
    }

    fn fail<'a, T: Send + 'a>(&self) -> BoxFuture<'a, ProviderResult<T>> {
        let error = self.error.detached();
        Box::pin(async move { Err(error) })
    }
}

impl EventSource for ErrorSource {
    fn name(&self) -> &str {
        "error"
    }

    fn import_event<'a>(
        &'a self,
        _identifier: &'a EventIdentifier,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        self.fail()
    }

    fn fetch_events<'a>(
        &'a self,
        _identifier: &'a EventIdentifier,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        self.fail()
    }

    fn fetch_club_events<'a>(
        &'a self,
        _club_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        self.fail()
    }

    fn fetch_page<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, ProviderResult<FetchedPage>> {
        self.fail()
    }

    fn follow_redirects<'a>(&'a self, _link: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use campfire_core::IdentifierOrigin;

    fn id(value: &str) -> EventIdentifier {
        EventIdentifier::new(value, IdentifierOrigin::Passthrough)
    }

    mod static_source {
        use super::*;

        #[tokio::test]
        async fn unknown_identifier_is_empty() {
            let source = StaticSource::new();
            let events = source.fetch_events(&id("missing")).await.unwrap();
            assert!(events.is_empty());
        }

        #[tokio::test]
        async fn returns_registered_events() {
            let source = StaticSource::new().with_events("abc", vec![RawEvent::new("Walk")]);
            let events = source.fetch_events(&id("abc")).await.unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].name.as_deref(), Some("Walk"));
        }

        #[tokio::test]
        async fn records_imports() {
            let source = StaticSource::new();
            source.import_event(&id("abc")).await.unwrap();
            source.import_event(&id("def")).await.unwrap();
            assert_eq!(source.imported(), vec!["abc", "def"]);
        }

        #[tokio::test]
        async fn rejected_imports_fail() {
            let source = StaticSource::new().with_rejected_imports();
            let err = source.import_event(&id("abc")).await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Upstream);
            assert!(source.imported().is_empty());
        }

        #[tokio::test]
        async fn redirects_and_unreachable_links() {
            let source = StaticSource::new()
                .with_redirect("https://cmpf.re/a", "https://campfire.example/meetup/x")
                .with_unreachable("https://cmpf.re/down");

            assert_eq!(
                source.follow_redirects("https://cmpf.re/a").await.unwrap(),
                "https://campfire.example/meetup/x"
            );
            assert_eq!(
                source.follow_redirects("https://other.example/").await.unwrap(),
                "https://other.example/"
            );
            let err = source
                .follow_redirects("https://cmpf.re/down")
                .await
                .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Upstream);
        }

        #[tokio::test]
        async fn pages_follow_redirects() {
            let source = StaticSource::new()
                .with_redirect("https://cmpf.re/p", "https://campfire.example/e/1")
                .with_page("https://campfire.example/e/1", "<h2>Walk</h2>");

            let page = source.fetch_page("https://cmpf.re/p").await.unwrap();
            assert_eq!(page.final_url, "https://campfire.example/e/1");
            assert_eq!(page.body, "<h2>Walk</h2>");

            let err = source.fetch_page("https://nowhere.example/").await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Upstream);
        }
    }

    #[tokio::test]
    async fn error_source_always_fails() {
        let source = ErrorSource::new(ProviderError::configuration("no endpoint"));

        let err = source.fetch_events(&id("abc")).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Configuration);
        assert_eq!(err.message(), "no endpoint");

        assert!(source.fetch_club_events("club").await.is_err());
        assert!(source.import_event(&id("abc")).await.is_err());
        assert!(source.fetch_page("https://x.example").await.is_err());
        assert!(source.follow_redirects("https://x.example").await.is_err());
        assert_eq!(source.name(), "error");
    }
}
