// # Gotify Notification Channel
//
// This crate delivers monitor notifications to a Gotify server.
//
// ## Behaviour
//
// - One HTTP request per notification, no retries (a failed delivery is
//   final; the next event is a fresh attempt)
// - Enabled only when both `gotify_server` and `gotify_token` are configured
// - HTTP timeout of 30 seconds
//
// ## Security Requirements
//
// - The application token NEVER appears in logs or `Debug` output
//
// ## API Reference
//
// - Create message: POST `<server>/message?token=<app token>`
//   form fields `title`, `message`, `priority`

use async_trait::async_trait;
use dnsmonitor_core::config::NotifyConfig;
use dnsmonitor_core::registry::ChannelRegistry;
use dnsmonitor_core::traits::NotificationChannelFactory;
use dnsmonitor_core::{Error, Notification, NotificationChannel, Priority, Result};
use reqwest::Url;
use std::time::Duration;

/// Channel name used in logs and the registry
pub const CHANNEL_NAME: &str = "gotify";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Gotify notification channel
pub struct GotifyChannel {
    /// Server base URL
    server: Option<String>,

    /// Application token
    /// ⚠️ NEVER log this value
    token: Option<String>,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for GotifyChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GotifyChannel")
            .field("server", &self.server)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

impl GotifyChannel {
    /// Create a Gotify channel
    ///
    /// Missing or empty credentials produce a disabled channel.
    pub fn new(server: Option<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            server: server.filter(|s| !s.is_empty()),
            token: token.filter(|t| !t.is_empty()),
            client,
        }
    }

    /// Create a channel from the notification config
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(config.gotify_server.clone(), config.gotify_token.clone())
    }
}

#[async_trait]
impl NotificationChannel for GotifyChannel {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let (Some(server), Some(token)) = (&self.server, &self.token) else {
            return Err(Error::notification(CHANNEL_NAME, "server or token not configured"));
        };

        let url = message_url(server)?;
        let priority = gotify_priority(notification.priority).to_string();

        tracing::debug!("Sending Gotify message: {}", notification.title);

        let response = self
            .client
            .post(url)
            .query(&[("token", token.as_str())])
            .form(&[
                ("title", notification.title.as_str()),
                ("message", notification.message.as_str()),
                ("priority", priority.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                // reqwest errors include the URL, which carries the token
                Error::notification(
                    CHANNEL_NAME,
                    format!("HTTP request failed: {}", e.without_url()),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => Error::notification(
                    CHANNEL_NAME,
                    format!("Authentication failed: invalid application token. Status: {}", status),
                ),
                _ => Error::notification(CHANNEL_NAME, format!("Server returned {}", status)),
            });
        }

        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        CHANNEL_NAME
    }

    fn is_enabled(&self) -> bool {
        self.server.is_some() && self.token.is_some()
    }
}

/// Gotify priority scale: 1 for informational, 5 for changes
pub fn gotify_priority(priority: Priority) -> u8 {
    match priority {
        Priority::Informational => 1,
        Priority::Change => 5,
    }
}

/// Build `<server>/message`, keeping any path prefix of the server URL
fn message_url(server: &str) -> Result<Url> {
    let mut url = Url::parse(server)
        .map_err(|e| Error::notification(CHANNEL_NAME, format!("Invalid server URL: {}", e)))?;

    let path = format!("{}/message", url.path().trim_end_matches('/'));
    url.set_path(&path);
    Ok(url)
}

/// Factory for the channel registry
pub struct GotifyFactory;

impl NotificationChannelFactory for GotifyFactory {
    fn create(&self, config: &NotifyConfig) -> Result<Box<dyn NotificationChannel>> {
        Ok(Box::new(GotifyChannel::from_config(config)))
    }
}

/// Register the Gotify channel
pub fn register(registry: &mut ChannelRegistry) {
    registry.register_channel(CHANNEL_NAME, Box::new(GotifyFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_url_appends_path() {
        let url = message_url("https://gotify.example.com").unwrap();
        assert_eq!(url.as_str(), "https://gotify.example.com/message");

        let url = message_url("https://example.com/gotify/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/gotify/message");
    }

    #[test]
    fn invalid_server_url_is_an_error() {
        assert!(message_url("not a url").is_err());
    }

    #[test]
    fn priorities_map_to_gotify_scale() {
        assert_eq!(gotify_priority(Priority::Informational), 1);
        assert_eq!(gotify_priority(Priority::Change), 5);
    }

    #[test]
    fn enabled_only_with_server_and_token() {
        let channel = GotifyChannel::new(Some("https://gotify.example.com".into()), None);
        assert!(!channel.is_enabled());

        let channel = GotifyChannel::new(
            Some("https://gotify.example.com".into()),
            Some(String::new()),
        );
        assert!(!channel.is_enabled());

        let channel = GotifyChannel::new(
            Some("https://gotify.example.com".into()),
            Some("token".into()),
        );
        assert!(channel.is_enabled());
    }

    #[test]
    fn debug_output_redacts_token() {
        let channel = GotifyChannel::new(
            Some("https://gotify.example.com".into()),
            Some("secret-app-token".into()),
        );
        let debug = format!("{:?}", channel);
        assert!(!debug.contains("secret-app-token"));
        assert!(debug.contains("<REDACTED>"));
    }

    #[test]
    fn registers_under_its_name() {
        let mut registry = ChannelRegistry::new();
        register(&mut registry);
        assert!(registry.has_channel(CHANNEL_NAME));
    }
}
