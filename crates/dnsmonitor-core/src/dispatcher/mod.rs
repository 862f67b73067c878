//! Notification fan-out
//!
//! The [`Dispatcher`] sends one [`Notification`] to every enabled channel at
//! once. Each channel runs in its own task, so a slow or failing channel never
//! holds up its siblings or the monitor loop.
//!
//! ```text
//!                     ┌──────────────┐
//!  Notification ────▶ │  Dispatcher  │
//!                     └──────────────┘
//!                            │ spawn (one task per enabled channel)
//!          ┌─────────────────┼─────────────────┐
//!          ▼                 ▼                 ▼
//!     ┌─────────┐       ┌─────────┐       ┌─────────┐
//!     │ gotify  │       │pushbullet│      │   ...   │
//!     └─────────┘       └─────────┘       └─────────┘
//!          │                 │                 │
//!          └────────── collector task ─────────┘
//!                  (logs failures, builds report)
//! ```

use crate::traits::{Notification, NotificationChannel};
use std::sync::Arc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, warn};

/// Outcome of one dispatch, once every channel task has finished
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Channels that accepted the notification
    pub delivered: Vec<&'static str>,
    /// Channels that failed (error or panic)
    pub failed: Vec<&'static str>,
}

/// Handle to an in-flight dispatch
///
/// Dropping the handle detaches the dispatch; it still runs to completion.
#[derive(Debug)]
pub struct DispatchHandle(JoinHandle<DispatchReport>);

impl DispatchHandle {
    /// Wait for every channel task to finish
    pub async fn wait(self) -> DispatchReport {
        match self.0.await {
            Ok(report) => report,
            Err(e) => {
                error!("Dispatch collector task failed: {}", e);
                DispatchReport::default()
            }
        }
    }
}

/// Fans notifications out to all enabled channels
#[derive(Clone, Default)]
pub struct Dispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl Dispatcher {
    /// Create a dispatcher over `channels`
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Names of the channels that will receive notifications
    pub fn enabled_channels(&self) -> Vec<&'static str> {
        self.channels
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| c.channel_name())
            .collect()
    }

    /// Send `notification` to every enabled channel concurrently
    ///
    /// Returns immediately. Failures are logged with the channel name and
    /// never reach the caller.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, notification: Notification) -> DispatchHandle {
        let notification = Arc::new(notification);
        let mut tasks = JoinSet::new();
        let mut names = Vec::new();

        for channel in &self.channels {
            if !channel.is_enabled() {
                debug!("Channel {} is disabled, skipping", channel.channel_name());
                continue;
            }

            let channel = Arc::clone(channel);
            let notification = Arc::clone(&notification);
            let name = channel.channel_name();
            let id = tasks
                .spawn(async move {
                    match channel.send(&notification).await {
                        Ok(()) => {
                            debug!(channel = name, "Notification delivered");
                            true
                        }
                        Err(e) => {
                            warn!(channel = name, "Notification failed: {}", e);
                            false
                        }
                    }
                })
                .id();
            names.push((id, name));
        }

        DispatchHandle(tokio::spawn(async move {
            let mut report = DispatchReport::default();

            while let Some(joined) = tasks.join_next_with_id().await {
                match joined {
                    Ok((id, delivered)) => {
                        let name = channel_for(&names, id);
                        if delivered {
                            report.delivered.push(name);
                        } else {
                            report.failed.push(name);
                        }
                    }
                    Err(e) => {
                        let name = channel_for(&names, e.id());
                        error!(channel = name, "Notification task aborted: {}", e);
                        report.failed.push(name);
                    }
                }
            }

            report
        }))
    }
}

fn channel_for(names: &[(tokio::task::Id, &'static str)], id: tokio::task::Id) -> &'static str {
    names
        .iter()
        .find(|(task_id, _)| *task_id == id)
        .map(|(_, name)| *name)
        .unwrap_or("unknown")
}
