//! Campfire API configuration.

use std::time::Duration;

use campfire_core::links::DEFAULT_CALENDAR_BASE;
use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Configuration for talking to the Campfire tools API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Events endpoint, queried with `?events=<id>` and POSTed to on import.
    pub events_endpoint: String,

    /// Clubs endpoint; club listings live at `<endpoint>/<club_id>/events`.
    pub clubs_endpoint: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Hosts whose links are shortlinks to be followed.
    ///
    /// Defaults to `["cmpf.re"]`.
    pub shortlink_hosts: Vec<String>,

    /// Whether to ask the API to import an event before fetching it.
    pub import_before_fetch: bool,

    /// Base URL for calendar-add links.
    pub calendar_base: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            events_endpoint: Self::DEFAULT_EVENTS_ENDPOINT.to_string(),
            clubs_endpoint: Self::DEFAULT_CLUBS_ENDPOINT.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("campfire/{}", env!("CARGO_PKG_VERSION")),
            shortlink_hosts: vec![Self::DEFAULT_SHORTLINK_HOST.to_string()],
            import_before_fetch: false,
            calendar_base: DEFAULT_CALENDAR_BASE.to_string(),
        }
    }
}

impl ApiConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Default events endpoint.
    pub const DEFAULT_EVENTS_ENDPOINT: &'static str = "https://campfire-tools.topi.wtf/api/events";

    /// Default clubs endpoint.
    pub const DEFAULT_CLUBS_ENDPOINT: &'static str = "https://campfire-tools.topi.wtf/api/clubs";

    /// Default shortlink host.
    pub const DEFAULT_SHORTLINK_HOST: &'static str = "cmpf.re";

    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the events endpoint.
    pub fn with_events_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.events_endpoint = endpoint.into();
        self
    }

    /// Sets the clubs endpoint.
    pub fn with_clubs_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.clubs_endpoint = endpoint.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the shortlink hosts.
    pub fn with_shortlink_hosts(mut self, hosts: Vec<String>) -> Self {
        self.shortlink_hosts = hosts;
        self
    }

    /// Enables or disables import before fetch.
    pub fn with_import_before_fetch(mut self, import: bool) -> Self {
        self.import_before_fetch = import;
        self
    }

    /// Sets the calendar base URL.
    pub fn with_calendar_base(mut self, base: impl Into<String>) -> Self {
        self.calendar_base = base.into();
        self
    }

    /// Returns the URL of a club's event listing.
    pub fn club_events_url(&self, club_id: &str) -> String {
        format!(
            "{}/{}/events",
            self.clubs_endpoint.trim_end_matches('/'),
            urlencoding::encode(club_id)
        )
    }

    /// Checks that endpoints are http(s) URLs and the timeout is non-zero.
    pub fn validate(&self) -> ProviderResult<()> {
        for (name, value) in [
            ("events endpoint", &self.events_endpoint),
            ("clubs endpoint", &self.clubs_endpoint),
            ("calendar base", &self.calendar_base),
        ] {
            let url = Url::parse(value).map_err(|e| {
                ProviderError::configuration(format!("invalid {} {:?}: {}", name, value, e))
                    .with_source(e)
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ProviderError::configuration(format!(
                    "{} must be an http(s) URL: {}",
                    name, value
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(ProviderError::configuration("timeout must be non-zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn defaults() {
        let config = ApiConfig::default();
        assert_eq!(
            config.events_endpoint,
            "https://campfire-tools.topi.wtf/api/events"
        );
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.shortlink_hosts, vec!["cmpf.re".to_string()]);
        assert!(!config.import_before_fetch);
        assert!(config.user_agent.starts_with("campfire/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn club_events_url() {
        let config = ApiConfig::default().with_clubs_endpoint("http://127.0.0.1:9/api/clubs/");
        assert_eq!(
            config.club_events_url("club 42"),
            "http://127.0.0.1:9/api/clubs/club%2042/events"
        );
    }

    #[test]
    fn rejects_bad_endpoint() {
        let err = ApiConfig::default()
            .with_events_endpoint("not a url")
            .validate()
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Configuration);
        assert!(err.message().contains("events endpoint"));

        let err = ApiConfig::default()
            .with_clubs_endpoint("ftp://example.com/clubs")
            .validate()
            .unwrap_err();
        assert!(err.message().contains("http(s)"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ApiConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Configuration);
    }
}
