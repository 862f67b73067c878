// # Pushbullet Notification Channel
//
// This crate delivers monitor notifications as Pushbullet "note" pushes.
//
// ## Behaviour
//
// - Enabled when `pushbullet_token` is configured
// - Target device: the configured `pushbullet_device` nickname, or the first
//   device on the account when none is configured
// - The device list is fetched on every send; nothing is cached between
//   notifications
// - No retries: a failed delivery is final for that event
//
// ## API Reference
//
// - List devices: GET `/v2/devices`
// - Create push: POST `/v2/pushes` `{"type": "note", "title", "body", "device_iden"}`
// - Authentication: `Access-Token` header

use async_trait::async_trait;
use dnsmonitor_core::config::NotifyConfig;
use dnsmonitor_core::registry::ChannelRegistry;
use dnsmonitor_core::traits::NotificationChannelFactory;
use dnsmonitor_core::{Error, Notification, NotificationChannel, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Channel name used in logs and the registry
pub const CHANNEL_NAME: &str = "pushbullet";

/// Pushbullet API base URL
const PUSHBULLET_API_BASE: &str = "https://api.pushbullet.com/v2";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A device registered on the Pushbullet account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Device {
    /// Device identifier used as push target
    pub iden: String,
    /// User-visible name
    #[serde(default)]
    pub nickname: Option<String>,
    /// Deleted devices are reported as inactive
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct DeviceList {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Debug, Serialize)]
struct NotePush<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    body: &'a str,
    device_iden: &'a str,
}

/// Pushbullet notification channel
pub struct PushbulletChannel {
    /// Access token
    /// ⚠️ NEVER log this value
    token: Option<String>,

    /// Device nickname to push to
    device: Option<String>,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for PushbulletChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushbulletChannel")
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .field("device", &self.device)
            .finish()
    }
}

impl PushbulletChannel {
    /// Create a Pushbullet channel
    ///
    /// A missing or empty token produces a disabled channel.
    pub fn new(token: Option<String>, device: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            token: token.filter(|t| !t.is_empty()),
            device: device.filter(|d| !d.is_empty()),
            client,
        }
    }

    /// Create a channel from the notification config
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self::new(
            config.pushbullet_token.clone(),
            config.pushbullet_device.clone(),
        )
    }

    async fn list_devices(&self, token: &str) -> Result<Vec<Device>> {
        let response = self
            .client
            .get(format!("{}/devices", PUSHBULLET_API_BASE))
            .header("Access-Token", token)
            .send()
            .await
            .map_err(|e| Error::notification(CHANNEL_NAME, format!("HTTP request failed: {}", e)))?;

        check_status(response.status())?;

        let list: DeviceList = response.json().await.map_err(|e| {
            Error::notification(CHANNEL_NAME, format!("Failed to parse device list: {}", e))
        })?;

        Ok(list.devices)
    }
}

#[async_trait]
impl NotificationChannel for PushbulletChannel {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let Some(token) = &self.token else {
            return Err(Error::notification(CHANNEL_NAME, "access token not configured"));
        };

        let devices = self.list_devices(token).await?;
        let device = select_device(&devices, self.device.as_deref())?;

        if self.device.is_none() {
            debug!(
                "Pushbullet: pushbullet_device not set in config, using \"{}\"",
                device.nickname.as_deref().unwrap_or(&device.iden)
            );
        }

        let push = NotePush {
            kind: "note",
            title: &notification.title,
            body: &notification.message,
            device_iden: &device.iden,
        };

        debug!("Sending Pushbullet note: {}", notification.title);

        let response = self
            .client
            .post(format!("{}/pushes", PUSHBULLET_API_BASE))
            .header("Access-Token", token.as_str())
            .json(&push)
            .send()
            .await
            .map_err(|e| Error::notification(CHANNEL_NAME, format!("HTTP request failed: {}", e)))?;

        check_status(response.status())
    }

    fn channel_name(&self) -> &'static str {
        CHANNEL_NAME
    }

    fn is_enabled(&self) -> bool {
        self.token.is_some()
    }
}

/// Pick the push target among the account's active devices
///
/// With a nickname, that device must exist. Without one, the first device
/// is used.
pub fn select_device<'a>(devices: &'a [Device], nickname: Option<&str>) -> Result<&'a Device> {
    let mut active = devices.iter().filter(|d| d.active);

    match nickname {
        Some(nickname) => active
            .find(|d| d.nickname.as_deref() == Some(nickname))
            .ok_or_else(|| {
                Error::notification(CHANNEL_NAME, format!("Device not found: {}", nickname))
            }),
        None => active.next().ok_or_else(|| {
            Error::notification(
                CHANNEL_NAME,
                "No devices appear to be set up for Pushbullet",
            )
        }),
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    Err(match status.as_u16() {
        401 | 403 => Error::notification(
            CHANNEL_NAME,
            format!("Authentication failed: invalid access token. Status: {}", status),
        ),
        429 => Error::notification(
            CHANNEL_NAME,
            format!("Rate limit exceeded. Status: {}", status),
        ),
        _ => Error::notification(CHANNEL_NAME, format!("API returned {}", status)),
    })
}

/// Factory for the channel registry
pub struct PushbulletFactory;

impl NotificationChannelFactory for PushbulletFactory {
    fn create(&self, config: &NotifyConfig) -> Result<Box<dyn NotificationChannel>> {
        Ok(Box::new(PushbulletChannel::from_config(config)))
    }
}

/// Register the Pushbullet channel
pub fn register(registry: &mut ChannelRegistry) {
    registry.register_channel(CHANNEL_NAME, Box::new(PushbulletFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<Device> {
        serde_json::from_str::<DeviceList>(
            r#"{"devices": [
                {"iden": "old", "nickname": "Retired", "active": false},
                {"iden": "ujpah72o0", "nickname": "Phone", "active": true},
                {"iden": "ujpah72o1", "nickname": "Laptop", "active": true}
            ]}"#,
        )
        .unwrap()
        .devices
    }

    #[test]
    fn first_active_device_is_default() {
        let devices = devices();
        let device = select_device(&devices, None).unwrap();
        assert_eq!(device.iden, "ujpah72o0");
    }

    #[test]
    fn configured_nickname_is_used() {
        let devices = devices();
        let device = select_device(&devices, Some("Laptop")).unwrap();
        assert_eq!(device.iden, "ujpah72o1");
    }

    #[test]
    fn inactive_or_unknown_device_is_an_error() {
        let devices = devices();
        assert!(select_device(&devices, Some("Retired")).is_err());
        assert!(select_device(&devices, Some("Tablet")).is_err());
    }

    #[test]
    fn no_devices_is_an_error_not_an_exit() {
        let err = select_device(&[], None).unwrap_err();
        assert!(err.to_string().contains("No devices"));
    }

    #[test]
    fn note_push_serializes_type_field() {
        let push = NotePush {
            kind: "note",
            title: "UPDATED [A] example.com",
            body: "was: 1.1.1.1\nnow: 2.2.2.2",
            device_iden: "ujpah72o0",
        };
        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(json["type"], "note");
        assert_eq!(json["body"], "was: 1.1.1.1\nnow: 2.2.2.2");
    }

    #[test]
    fn enabled_only_with_token() {
        assert!(!PushbulletChannel::new(None, None).is_enabled());
        assert!(!PushbulletChannel::new(Some(String::new()), None).is_enabled());
        assert!(PushbulletChannel::new(Some("o.token".into()), None).is_enabled());
    }

    #[test]
    fn registers_under_its_name() {
        let mut registry = ChannelRegistry::new();
        register(&mut registry);
        assert!(registry.has_channel(CHANNEL_NAME));
    }
}
