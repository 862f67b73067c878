// # Notification Channel Trait
//
// Defines the interface for delivering a notification to an external
// service (Gotify, Pushbullet, ...).
//
// ## Implementations
//
// - Gotify: `dnsmonitor-notify-gotify` crate
// - Pushbullet: `dnsmonitor-notify-pushbullet` crate
//
// Channels are single-shot: one delivery attempt per call, no retries and no
// queued backlog. The next triggering event is a fresh attempt.

use async_trait::async_trait;
use std::fmt;

/// Severity hint attached to a notification
///
/// Each channel maps it onto its own priority scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// First observation of a domain
    Informational,
    /// The observed value changed
    Change,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Informational => f.write_str("informational"),
            Priority::Change => f.write_str("change"),
        }
    }
}

/// A rendered notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
    /// Severity hint
    pub priority: Priority,
}

impl Notification {
    /// Create a notification
    pub fn new(title: impl Into<String>, message: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            priority,
        }
    }
}

/// Trait for notification channel implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe: the dispatcher calls `send` from a
/// spawned task per channel.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver one notification
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The service accepted the notification
    /// - `Err(Error)`: Delivery failed (logged by the dispatcher, not retried)
    async fn send(&self, notification: &Notification) -> Result<(), crate::Error>;

    /// Get the channel name (for logging/debugging)
    fn channel_name(&self) -> &'static str;

    /// Whether the channel has the credentials it needs
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Helper trait for constructing channels from configuration
pub trait NotificationChannelFactory: Send + Sync {
    /// Create a channel from the notification configuration
    ///
    /// A channel whose credentials are missing is still created; it reports
    /// itself as disabled.
    fn create(
        &self,
        config: &crate::config::NotifyConfig,
    ) -> Result<Box<dyn NotificationChannel>, crate::Error>;
}
