//! Configuration types for the DNS monitor
//!
//! [`MonitorConfig`] drives the monitor loop and resolver selection.
//! [`NotifyConfig`] holds channel credentials and is read from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Monitor loop configuration
///
/// Read-only for the lifetime of the process once handed to the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interval between resolution cycles (in seconds)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Nameserver to query instead of the system resolver (host or IP)
    #[serde(default)]
    pub custom_resolver: Option<String>,

    /// Capacity of the monitor event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl MonitorConfig {
    /// Create a configuration with defaults (5 minute interval, system resolver)
    pub fn new() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            custom_resolver: None,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the cycle interval in minutes
    pub fn with_interval_minutes(mut self, minutes: u64) -> Self {
        self.interval_secs = minutes.saturating_mul(60);
        self
    }

    /// Set the custom resolver endpoint
    pub fn with_custom_resolver(mut self, resolver: Option<String>) -> Self {
        self.custom_resolver = resolver.filter(|r| !r.trim().is_empty());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_interval_secs() -> u64 {
    300
}

fn default_event_channel_capacity() -> usize {
    1000
}

/// Notification channel credentials
///
/// A channel is enabled only when its credentials are present.
/// Field names match the keys of the `dnsmonitor.json` config file.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Gotify server URL (e.g. `https://gotify.example.com`)
    #[serde(default)]
    pub gotify_server: Option<String>,

    /// Gotify application token
    #[serde(default)]
    pub gotify_token: Option<String>,

    /// Pushbullet access token
    #[serde(default)]
    pub pushbullet_token: Option<String>,

    /// Pushbullet device nickname (first device when unset)
    #[serde(default)]
    pub pushbullet_device: Option<String>,
}

// Tokens stay out of logs
impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("gotify_server", &self.gotify_server)
            .field("gotify_token", &self.gotify_token.as_ref().map(|_| "<REDACTED>"))
            .field(
                "pushbullet_token",
                &self.pushbullet_token.as_ref().map(|_| "<REDACTED>"),
            )
            .field("pushbullet_device", &self.pushbullet_device)
            .finish()
    }
}

impl NotifyConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the configuration file at `path`
    ///
    /// A file that cannot be read yields the default (no channels).
    /// A file that exists but does not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let path = path.as_ref();

        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, notifications disabled", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                warn!("Unable to read {}: {}", path.display(), e);
                return Ok(Self::default());
            }
        };

        Self::from_json(&json).map_err(|e| {
            crate::Error::config(format!("Error parsing {}: {}", path.display(), e))
        })
    }

    /// Both Gotify server and token are set and non-empty
    pub fn gotify_enabled(&self) -> bool {
        is_set(&self.gotify_server) && is_set(&self.gotify_token)
    }

    /// The Pushbullet token is set and non-empty
    pub fn pushbullet_enabled(&self) -> bool {
        is_set(&self.pushbullet_token)
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_five_minutes() {
        let config = MonitorConfig::default();
        assert_eq!(config.interval_secs, 300);
        assert!(config.custom_resolver.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = MonitorConfig::new().with_interval_minutes(0);
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn blank_custom_resolver_means_system_resolver() {
        let config = MonitorConfig::new().with_custom_resolver(Some("  ".to_string()));
        assert!(config.custom_resolver.is_none());

        let config = MonitorConfig::new().with_custom_resolver(Some("1.1.1.1".to_string()));
        assert_eq!(config.custom_resolver.as_deref(), Some("1.1.1.1"));
    }

    #[test]
    fn notify_config_uses_file_keys() {
        let config = NotifyConfig::from_json(
            r#"{"gotify_server": "https://gotify.example.com", "gotify_token": "abc"}"#,
        )
        .unwrap();

        assert!(config.gotify_enabled());
        assert!(!config.pushbullet_enabled());
    }

    #[test]
    fn empty_credentials_do_not_enable_channels() {
        let config = NotifyConfig::from_json(
            r#"{
                "gotify_server": "https://gotify.example.com",
                "gotify_token": "",
                "pushbullet_token": ""
            }"#,
        )
        .unwrap();

        assert!(!config.gotify_enabled());
        assert!(!config.pushbullet_enabled());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let result = NotifyConfig::from_json("{ not json");
        assert!(matches!(result, Err(crate::Error::Json(_))));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = NotifyConfig::load("/nonexistent/dnsmonitor.json").unwrap();
        assert_eq!(config, NotifyConfig::default());
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let config = NotifyConfig {
            gotify_token: Some("secret-token".to_string()),
            pushbullet_token: Some("other-secret".to_string()),
            ..Default::default()
        };

        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("other-secret"));
        assert!(debug.contains("<REDACTED>"));
    }
}
