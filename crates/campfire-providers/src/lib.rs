//! Event sources, link resolution and normalization for Campfire events.
//!
//! This crate provides everything between a user-supplied link and a
//! display-ready [`EventRecord`](campfire_core::EventRecord):
//!
//! - [`EventSource`] - The trait for upstream access
//! - [`CampfireClient`] - The reqwest implementation (feature `http`)
//! - [`Resolver`] - Link to identifier resolution
//! - [`normalize_event`] / [`scrape_event`] - Upstream data to records
//! - [`EventService`] - One request, end to end
//! - [`ProviderError`] - Error types for all of the above
//!
//! # Architecture
//!
//! ```text
//!   link ──▶ Resolver ──▶ EventIdentifier
//!               │                │
//!               │ redirects      ▼
//!               │        ┌───────────────┐
//!               └──────▶ │  EventSource  │ ◀── CampfireClient / StaticSource
//!                        └───────┬───────┘
//!                                │ RawEvent / HTML
//!                                ▼
//!                 normalize_event() / scrape_event()
//!                                │
//!                                ▼
//!                          EventRecord
//! ```
//!
//! # Example
//!
//! ```ignore
//! use campfire_providers::{ApiConfig, CampfireClient, EventService};
//! use campfire_core::NormalizerConfig;
//!
//! let api = ApiConfig::default();
//! let client = CampfireClient::new(api.clone())?;
//! let service = EventService::from_config(Box::new(client), &api, NormalizerConfig::default());
//! let record = service.lookup("https://cmpf.re/AbC123").await?;
//! println!("{}", service.calendar_link(&record));
//! ```

pub mod campfire;
pub mod error;
pub mod normalize;
pub mod raw_event;
pub mod resolver;
pub mod scrape;
pub mod service;
pub mod source;

// Re-export main types at crate root
#[cfg(feature = "http")]
pub use campfire::CampfireClient;
pub use campfire::ApiConfig;
pub use error::{NOT_FOUND_MESSAGE, ProviderError, ProviderErrorCode, ProviderResult};
pub use normalize::{normalize_event, normalize_listed, normalize_listing};
pub use raw_event::{RawEvent, RawMember};
pub use resolver::{ResolveStrategy, Resolver};
pub use scrape::scrape_event;
pub use service::EventService;
pub use source::{BoxFuture, ErrorSource, EventSource, FetchedPage, StaticSource};
