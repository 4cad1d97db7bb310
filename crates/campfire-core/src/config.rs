//! Normalization settings.
//!
//! Every fixed value the normalizer relies on lives here and is passed in
//! explicitly through [`NormalizerConfig`].

use chrono::Duration;
use chrono_tz::Tz;

/// Timezone events are displayed in.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::London;

/// Display format for event start/end times.
pub const DEFAULT_DISPLAY_FORMAT: &str = "%a %d %b %Y, %H:%M";

/// Duration assumed when an event has no explicit end.
pub const DEFAULT_ASSUMED_DURATION_MINUTES: i64 = 60;

/// Title used when the event has no usable name.
pub const FALLBACK_TITLE: &str = "Campfire Event";

/// Location used when the event has neither a location nor a URL.
pub const FALLBACK_LOCATION: &str = "Unknown location";

/// Display time used when an event's time is missing or malformed.
pub const UNKNOWN_TIME: &str = "Unknown time";

/// Settings used when shaping upstream data into event records.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizerConfig {
    /// Timezone for display and for interpreting scraped wall-clock times.
    pub timezone: Tz,
    /// `strftime` format for displayed times.
    pub display_format: String,
    /// Duration assumed when no end time is given.
    pub assumed_duration: Duration,
    /// Placeholder title.
    pub fallback_title: String,
    /// Placeholder location.
    pub fallback_location: String,
    /// Placeholder display time.
    pub unknown_time: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
            assumed_duration: Duration::minutes(DEFAULT_ASSUMED_DURATION_MINUTES),
            fallback_title: FALLBACK_TITLE.to_string(),
            fallback_location: FALLBACK_LOCATION.to_string(),
            unknown_time: UNKNOWN_TIME.to_string(),
        }
    }
}

impl NormalizerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the display timezone.
    #[must_use]
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Builder method to set the display format.
    #[must_use]
    pub fn with_display_format(mut self, format: impl Into<String>) -> Self {
        self.display_format = format.into();
        self
    }

    /// Builder method to set the assumed duration.
    #[must_use]
    pub fn with_assumed_duration(mut self, duration: Duration) -> Self {
        self.assumed_duration = duration;
        self
    }

    /// Builder method to set the placeholder title.
    #[must_use]
    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }

    /// Builder method to set the placeholder location.
    #[must_use]
    pub fn with_fallback_location(mut self, location: impl Into<String>) -> Self {
        self.fallback_location = location.into();
        self
    }

    /// Builder method to set the unknown-time placeholder.
    #[must_use]
    pub fn with_unknown_time(mut self, text: impl Into<String>) -> Self {
        self.unknown_time = text.into();
        self
    }
}
