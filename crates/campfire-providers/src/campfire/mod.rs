//! Campfire tools API access.
//!
//! [`ApiConfig`] is always available since the resolver and service read
//! their settings from it. [`CampfireClient`] needs the `http` feature.
//!
//! # Example
//!
//! ```ignore
//! use campfire_providers::campfire::{ApiConfig, CampfireClient};
//!
//! let client = CampfireClient::new(ApiConfig::default().with_import_before_fetch(true))?;
//! let events = client.fetch_club_events("club-42").await?;
//! ```

#[cfg(feature = "http")]
mod client;
mod config;

#[cfg(feature = "http")]
pub use client::CampfireClient;
pub use config::ApiConfig;
