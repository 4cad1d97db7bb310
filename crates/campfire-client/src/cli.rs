//! Command-line interface definition.

use std::path::PathBuf;

use campfire_core::OutputFormat;
use clap::{Args, Parser, Subcommand};

use crate::config::ClientConfig;

/// campfire - Turn Campfire meetup links into calendar events
#[derive(Debug, Parser)]
#[command(name = "campfire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CAMPFIRE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    // --- Connection flags ---
    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Events API endpoint
    #[arg(long, env = "CAMPFIRE_EVENTS_ENDPOINT", global = true)]
    pub events_endpoint: Option<String>,

    /// Clubs API endpoint
    #[arg(long, env = "CAMPFIRE_CLUBS_ENDPOINT", global = true)]
    pub clubs_endpoint: Option<String>,

    /// Ask the API to import the event before fetching it
    #[arg(long, global = true)]
    pub import: bool,

    // --- Display flags ---
    /// IANA timezone to display times in
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// Maximum title length (truncated with ellipsis)
    #[arg(long, global = true)]
    pub max_title_length: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout = timeout;
        }
        if let Some(ref endpoint) = self.events_endpoint {
            config.api.events_endpoint = endpoint.clone();
        }
        if let Some(ref endpoint) = self.clubs_endpoint {
            config.api.clubs_endpoint = endpoint.clone();
        }
        if self.import {
            config.api.import_before_fetch = true;
        }
        if let Some(ref timezone) = self.timezone {
            config.display.timezone = timezone.clone();
        }
        if self.max_title_length.is_some() {
            config.display.max_title_length = self.max_title_length;
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up an event from a Campfire or meetup link
    Event {
        /// Event link (cmpf.re shortlink, meetup URL or bare event id)
        link: String,

        #[command(flatten)]
        output: EventOutput,
    },

    /// List a club's events
    Club {
        /// Club identifier
        club_id: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Scrape an event page directly
    Scrape {
        /// Event page URL
        url: String,

        #[command(flatten)]
        output: EventOutput,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Output and action flags for a single event.
#[derive(Debug, Clone, Default, Args)]
pub struct EventOutput {
    /// Output in JSON format
    #[arg(long, conflicts_with = "link_only")]
    pub json: bool,

    /// Print only the calendar-add link
    #[arg(long)]
    pub link_only: bool,

    /// Open the calendar-add link in the default browser
    #[arg(long)]
    pub open: bool,

    /// Copy the calendar-add link to the clipboard
    #[arg(long)]
    pub copy: bool,
}

impl EventOutput {
    /// Returns the output format based on the flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_event_command() {
        let cli = Cli::try_parse_from(["campfire", "event", "https://cmpf.re/AbC123", "--json"])
            .unwrap();
        match cli.command {
            Command::Event { link, output } => {
                assert_eq!(link, "https://cmpf.re/AbC123");
                assert_eq!(output.output_format(), OutputFormat::Json);
                assert!(!output.link_only);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn json_conflicts_with_link_only() {
        let result = Cli::try_parse_from(["campfire", "event", "abc", "--json", "--link-only"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "campfire",
            "club",
            "club-1",
            "--timeout",
            "3",
            "--timezone",
            "UTC",
            "--import",
        ])
        .unwrap();

        let mut config = ClientConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api.timeout, 3);
        assert_eq!(config.display.timezone, "UTC");
        assert!(config.api.import_before_fetch);
    }

    #[test]
    fn overrides_leave_unset_values() {
        let cli = Cli::try_parse_from(["campfire", "config", "path"]).unwrap();
        let mut config = ClientConfig::default();
        config.display.max_title_length = Some(30);
        cli.apply_overrides(&mut config);
        assert_eq!(config, {
            let mut expected = ClientConfig::default();
            expected.display.max_title_length = Some(30);
            expected
        });
    }

    #[test]
    fn requires_subcommand() {
        assert!(Cli::try_parse_from(["campfire"]).is_err());
    }
}
