//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/campfire/config.toml` by default:
//!
//! ```toml
//! [api]
//! events_endpoint = "https://campfire-tools.topi.wtf/api/events"
//! timeout = 10
//! import_before_fetch = true
//!
//! [display]
//! timezone = "Europe/London"
//! date_format = "%a %d %b %Y, %H:%M"
//! ```

use std::path::{Path, PathBuf};

use campfire_core::config::{
    DEFAULT_ASSUMED_DURATION_MINUTES, DEFAULT_DISPLAY_FORMAT, DEFAULT_TIMEZONE, FALLBACK_LOCATION,
    FALLBACK_TITLE, UNKNOWN_TIME,
};
use campfire_core::{FormatOptions, NormalizerConfig, is_valid_format};
use campfire_providers::ApiConfig;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Longest assumed event duration accepted from configuration (one year).
pub const MAX_ASSUMED_DURATION_MINUTES: i64 = 366 * 24 * 60;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the campfire client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Upstream API settings.
    pub api: ApiSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Upstream API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Events endpoint.
    pub events_endpoint: String,

    /// Clubs endpoint.
    pub clubs_endpoint: String,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// User agent override.
    pub user_agent: Option<String>,

    /// Hosts treated as shortlinks.
    pub shortlink_hosts: Vec<String>,

    /// Ask the API to import an event before fetching it.
    pub import_before_fetch: bool,

    /// Base URL for calendar-add links.
    pub calendar_base: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        let api = ApiConfig::default();
        Self {
            events_endpoint: api.events_endpoint,
            clubs_endpoint: api.clubs_endpoint,
            timeout: api.timeout.as_secs(),
            user_agent: None,
            shortlink_hosts: api.shortlink_hosts,
            import_before_fetch: api.import_before_fetch,
            calendar_base: api.calendar_base,
        }
    }
}

impl ApiSettings {
    /// Converts to the provider configuration and validates it.
    pub fn to_api_config(&self) -> Result<ApiConfig, String> {
        let mut config = ApiConfig::default()
            .with_events_endpoint(&self.events_endpoint)
            .with_clubs_endpoint(&self.clubs_endpoint)
            .with_timeout(std::time::Duration::from_secs(self.timeout))
            .with_shortlink_hosts(self.shortlink_hosts.clone())
            .with_import_before_fetch(self.import_before_fetch)
            .with_calendar_base(&self.calendar_base);

        if let Some(ref user_agent) = self.user_agent {
            config = config.with_user_agent(user_agent);
        }

        config.validate().map_err(|e| e.message().to_string())?;
        Ok(config)
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// IANA timezone events are shown in.
    pub timezone: String,

    /// `strftime` format for times.
    pub date_format: String,

    /// Duration assumed when an event has no end.
    pub assumed_duration_minutes: i64,

    /// Title used when an event has none.
    pub fallback_title: String,

    /// Location used when an event has none.
    pub fallback_location: String,

    /// Shown for listing entries without a usable time.
    pub unknown_time: String,

    /// Maximum title length (truncated with ellipsis).
    pub max_title_length: Option<usize>,

    /// Emit terminal hyperlinks.
    pub hyperlinks: bool,

    /// Text to show for an empty club listing.
    pub no_events_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.name().to_string(),
            date_format: DEFAULT_DISPLAY_FORMAT.to_string(),
            assumed_duration_minutes: DEFAULT_ASSUMED_DURATION_MINUTES,
            fallback_title: FALLBACK_TITLE.to_string(),
            fallback_location: FALLBACK_LOCATION.to_string(),
            unknown_time: UNKNOWN_TIME.to_string(),
            max_title_length: None,
            hyperlinks: false,
            no_events_text: FormatOptions::default().no_events_text,
        }
    }
}

impl DisplaySettings {
    /// Converts to the normalizer configuration.
    pub fn to_normalizer_config(&self) -> Result<NormalizerConfig, String> {
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|_| format!("unknown timezone {:?}", self.timezone))?;

        if !is_valid_format(&self.date_format) {
            return Err(format!("invalid date_format {:?}", self.date_format));
        }

        if !(0..=MAX_ASSUMED_DURATION_MINUTES).contains(&self.assumed_duration_minutes) {
            return Err(format!(
                "assumed_duration_minutes must be between 0 and {} (got {})",
                MAX_ASSUMED_DURATION_MINUTES, self.assumed_duration_minutes
            ));
        }
        let assumed = chrono::Duration::try_minutes(self.assumed_duration_minutes).ok_or_else(
            || format!("assumed_duration_minutes out of range: {}", self.assumed_duration_minutes),
        )?;

        Ok(NormalizerConfig::new()
            .with_timezone(timezone)
            .with_display_format(&self.date_format)
            .with_assumed_duration(assumed)
            .with_fallback_title(&self.fallback_title)
            .with_fallback_location(&self.fallback_location)
            .with_unknown_time(&self.unknown_time))
    }

    /// Returns the formatter options.
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            display_format: self.date_format.clone(),
            max_title_length: self.max_title_length,
            hyperlinks: self.hyperlinks,
            no_events_text: self.no_events_text.clone(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("campfire")
    }
}
