//! Campfire tools API client.
//!
//! This module provides [`CampfireClient`], the reqwest-backed
//! [`EventSource`]. Every call is a single attempt bounded by the
//! configured timeout.

use campfire_core::EventIdentifier;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::RawEvent;
use crate::source::{BoxFuture, EventSource, FetchedPage};

use super::config::ApiConfig;

/// HTTP client for the Campfire tools API.
#[derive(Debug, Clone)]
pub struct CampfireClient {
    http_client: reqwest::Client,
    config: ApiConfig,
}

impl CampfireClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> ProviderResult<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn import(&self, identifier: &EventIdentifier) -> ProviderResult<()> {
        debug!(
            "importing event {} via {}",
            identifier, self.config.events_endpoint
        );

        let response = self
            .http_client
            .post(&self.config.events_endpoint)
            .json(&[identifier.as_str()])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::upstream(format!(
            "import failed ({}): {}",
            status,
            body.trim()
        )))
    }

    async fn events(&self, identifier: &EventIdentifier) -> ProviderResult<Vec<RawEvent>> {
        debug!(
            "fetching event {} ({}) from {}",
            identifier,
            identifier.origin().as_str(),
            self.config.events_endpoint
        );

        let request = self
            .http_client
            .get(&self.config.events_endpoint)
            .query(&[("events", identifier.as_str())]);

        let events = self.get_json(request).await?;
        debug!("received {} events for {}", events.len(), identifier);
        Ok(events)
    }

    async fn club_events(&self, club_id: &str) -> ProviderResult<Vec<RawEvent>> {
        let url = self.config.club_events_url(club_id);
        debug!("fetching club events from {}", url);

        let events = self.get_json(self.http_client.get(&url)).await?;
        debug!("received {} events for club {}", events.len(), club_id);
        Ok(events)
    }

    async fn page(&self, url: &str) -> ProviderResult<FetchedPage> {
        debug!("fetching page {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::upstream(format!(
                "page request failed ({}): {}",
                status, url
            )));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::upstream(format!("failed to read response: {}", e)))?;

        Ok(FetchedPage::new(final_url, body))
    }

    async fn redirect_target(&self, link: &str) -> ProviderResult<String> {
        let response = self
            .http_client
            .get(link)
            .send()
            .await
            .map_err(request_error)?;

        let final_url = response.url().to_string();
        debug!(
            "followed {} to {} ({})",
            link,
            final_url,
            response.status()
        );
        Ok(final_url)
    }

    /// Sends a GET and decodes an array of events.
    async fn get_json(&self, request: reqwest::RequestBuilder) -> ProviderResult<Vec<RawEvent>> {
        let response = request.send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::upstream(format!(
                "API error ({}): {}",
                status,
                body.trim()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::upstream(format!("failed to read response: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::parse(format!("failed to parse response: {}", e)).with_source(e)
        })
    }
}

/// Maps a transport failure to an upstream error.
fn request_error(e: reqwest::Error) -> ProviderError {
    let message = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    ProviderError::upstream(message).with_source(e)
}

impl EventSource for CampfireClient {
    fn name(&self) -> &str {
        "campfire"
    }

    fn import_event<'a>(
        &'a self,
        identifier: &'a EventIdentifier,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.import(identifier))
    }

    fn fetch_events<'a>(
        &'a self,
        identifier: &'a EventIdentifier,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(self.events(identifier))
    }

    fn fetch_club_events<'a>(
        &'a self,
        club_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(self.club_events(club_id))
    }

    fn fetch_page<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<FetchedPage>> {
        Box::pin(self.page(url))
    }

    fn follow_redirects<'a>(&'a self, link: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(self.redirect_target(link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use campfire_core::IdentifierOrigin;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::{Arc, Mutex};
    use std::thread;

    const UUID: &str = "9f1c2e3a-4b5d-4e6f-8a7b-0c1d2e3f4a5b";

    /// A request as seen by the loopback server.
    #[derive(Debug, Clone)]
    struct Recorded {
        method: String,
        target: String,
        body: String,
    }

    struct Reply {
        status: &'static str,
        headers: Vec<(&'static str, String)>,
        body: String,
    }

    impl Reply {
        fn ok(body: impl Into<String>) -> Self {
            Self {
                status: "200 OK",
                headers: vec![("Content-Type", "application/json".to_string())],
                body: body.into(),
            }
        }

        fn status(status: &'static str, body: impl Into<String>) -> Self {
            Self {
                status,
                headers: Vec::new(),
                body: body.into(),
            }
        }

        fn redirect(location: &str) -> Self {
            Self {
                status: "302 Found",
                headers: vec![("Location", location.to_string())],
                body: String::new(),
            }
        }
    }

    struct TestServer {
        base: String,
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    impl TestServer {
        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        fn config(&self) -> ApiConfig {
            ApiConfig::default()
                .with_events_endpoint(format!("{}/api/events", self.base))
                .with_clubs_endpoint(format!("{}/api/clubs", self.base))
        }
    }

    /// Starts a loopback HTTP/1.1 server answering every request with `handler`.
    fn serve<F>(handler: F) -> TestServer
    where
        F: Fn(&Recorded) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                if let Some(request) = read_request(&stream) {
                    let reply = handler(&request);
                    seen.lock().unwrap().push(request);
                    write_reply(stream, reply);
                }
            }
        });

        TestServer { base, requests }
    }

    fn read_request(stream: &TcpStream) -> Option<Recorded> {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let mut parts = line.split_whitespace();
        let method = parts.next()?.to_string();
        let target = parts.next()?.to_string();

        let mut content_length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).ok()?;
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).ok()?;

        Some(Recorded {
            method,
            target,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    fn write_reply(mut stream: TcpStream, reply: Reply) {
        let mut response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
            reply.status,
            reply.body.len()
        );
        for (name, value) in reply.headers {
            response.push_str(&format!("{}: {}\r\n", name, value));
        }
        response.push_str("\r\n");
        response.push_str(&reply.body);
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();
    }

    fn id(value: &str) -> EventIdentifier {
        EventIdentifier::new(value, IdentifierOrigin::Passthrough)
    }

    #[test]
    fn rejects_invalid_config() {
        let err = CampfireClient::new(ApiConfig::default().with_events_endpoint("nope"))
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Configuration);
    }

    mod events {
        use super::*;

        #[tokio::test]
        async fn fetches_by_identifier() {
            let server = serve(|_| {
                Reply::ok(r#"[{"name": "Walk", "time": "2025-07-15T18:00:00Z"}]"#)
            });
            let client = CampfireClient::new(server.config()).unwrap();

            let events = client.fetch_events(&id(UUID)).await.unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].name.as_deref(), Some("Walk"));

            let requests = server.requests();
            assert_eq!(requests[0].method, "GET");
            assert_eq!(requests[0].target, format!("/api/events?events={}", UUID));
        }

        #[tokio::test]
        async fn empty_array_is_empty() {
            let server = serve(|_| Reply::ok("[]"));
            let client = CampfireClient::new(server.config()).unwrap();

            let events = client.fetch_events(&id("abc")).await.unwrap();
            assert!(events.is_empty());
        }

        #[tokio::test]
        async fn non_success_is_upstream() {
            let server = serve(|_| Reply::status("404 Not Found", "missing"));
            let client = CampfireClient::new(server.config()).unwrap();

            let err = client.fetch_events(&id("abc")).await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Upstream);
            assert!(err.message().contains("404"));
        }

        #[tokio::test]
        async fn malformed_body_is_parse_error() {
            let server = serve(|_| Reply::ok(r#"{"error": "nope"}"#));
            let client = CampfireClient::new(server.config()).unwrap();

            let err = client.fetch_events(&id("abc")).await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Parse);
        }

        #[tokio::test]
        async fn unreachable_is_upstream() {
            // Bind then drop to get a port nobody listens on.
            let port = TcpListener::bind("127.0.0.1:0")
                .unwrap()
                .local_addr()
                .unwrap()
                .port();
            let config = ApiConfig::default()
                .with_events_endpoint(format!("http://127.0.0.1:{}/api/events", port));
            let client = CampfireClient::new(config).unwrap();

            let err = client.fetch_events(&id("abc")).await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Upstream);
        }
    }

    mod import {
        use super::*;

        #[tokio::test]
        async fn posts_identifier_array() {
            let server = serve(|_| Reply::status("204 No Content", ""));
            let client = CampfireClient::new(server.config()).unwrap();

            client.import_event(&id(UUID)).await.unwrap();

            let requests = server.requests();
            assert_eq!(requests[0].method, "POST");
            assert_eq!(requests[0].target, "/api/events");
            let body: Vec<String> = serde_json::from_str(&requests[0].body).unwrap();
            assert_eq!(body, vec![UUID.to_string()]);
        }

        #[tokio::test]
        async fn ok_status_is_success() {
            let server = serve(|_| Reply::ok("{}"));
            let client = CampfireClient::new(server.config()).unwrap();
            assert!(client.import_event(&id("abc")).await.is_ok());
        }

        #[tokio::test]
        async fn other_status_is_upstream() {
            let server = serve(|_| Reply::status("202 Accepted", ""));
            let client = CampfireClient::new(server.config()).unwrap();

            let err = client.import_event(&id("abc")).await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Upstream);
            assert!(err.message().contains("202"));
        }
    }

    #[tokio::test]
    async fn fetches_club_events() {
        let server = serve(|_| Reply::ok(r#"[{"name": "A"}, {"name": "B"}]"#));
        let client = CampfireClient::new(server.config()).unwrap();

        let events = client.fetch_club_events("club-42").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(server.requests()[0].target, "/api/clubs/club-42/events");
    }

    #[tokio::test]
    async fn club_events_survive_numeric_time() {
        let server = serve(|_| {
            Reply::ok(r#"[{"name": "A", "time": "2025-09-10T09:00:00Z"}, {"name": "B", "time": 1757408400}]"#)
        });
        let client = CampfireClient::new(server.config()).unwrap();

        let events = client.fetch_club_events("club-42").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].time_or_empty(), "1757408400");
    }

    mod redirects {
        use super::*;

        #[tokio::test]
        async fn follows_shortlink_to_final_url() {
            let server = serve(|request| {
                if request.target == "/AbC123" {
                    Reply::redirect(&format!("/discover/meetup/{}", UUID))
                } else {
                    Reply::status("200 OK", "<html></html>")
                }
            });
            let client = CampfireClient::new(server.config()).unwrap();

            let final_url = client
                .follow_redirects(&format!("{}/AbC123", server.base))
                .await
                .unwrap();
            assert_eq!(
                final_url,
                format!("{}/discover/meetup/{}", server.base, UUID)
            );
        }

        #[tokio::test]
        async fn page_reports_final_url() {
            let server = serve(|request| {
                if request.target == "/e" {
                    Reply::redirect("/events/1")
                } else {
                    Reply::status("200 OK", "<h2>Walk</h2>")
                }
            });
            let client = CampfireClient::new(server.config()).unwrap();

            let page = client
                .fetch_page(&format!("{}/e", server.base))
                .await
                .unwrap();
            assert_eq!(page.final_url, format!("{}/events/1", server.base));
            assert_eq!(page.body, "<h2>Walk</h2>");
        }

        #[tokio::test]
        async fn missing_page_is_upstream() {
            let server = serve(|_| Reply::status("404 Not Found", ""));
            let client = CampfireClient::new(server.config()).unwrap();

            let err = client
                .fetch_page(&format!("{}/gone", server.base))
                .await
                .unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::Upstream);
        }
    }
}
