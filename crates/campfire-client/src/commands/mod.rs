//! Subcommand implementations.

pub mod club;
pub mod config;
pub mod event;
pub mod scrape;
