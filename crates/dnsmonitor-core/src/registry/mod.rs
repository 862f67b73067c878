//! Plugin-based channel registry
//!
//! The registry allows notification channels to be registered at startup,
//! avoiding a hard-coded list of services in the monitor.
//!
//! ## Registration
//!
//! Channel crates register themselves during initialization:
//!
//! ```rust,ignore
//! // In dnsmonitor-notify-gotify
//! pub fn register(registry: &mut ChannelRegistry) {
//!     registry.register_channel("gotify", Box::new(GotifyFactory));
//! }
//! ```

use crate::config::NotifyConfig;
use crate::error::Result;
use crate::traits::{NotificationChannel, NotificationChannelFactory};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Channel registry for plugin-based channel creation
///
/// Channels are created in name order, which keeps log output stable.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: BTreeMap<String, Box<dyn NotificationChannelFactory>>,
}

impl ChannelRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel factory under `name`
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register_channel(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn NotificationChannelFactory>,
    ) {
        self.channels.insert(name.into(), factory);
    }

    /// Check if a channel type is registered
    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// List all registered channel types
    pub fn list_channels(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    /// Create every registered channel from `config`
    ///
    /// Channels without credentials are still returned; the dispatcher skips
    /// them because they report themselves disabled.
    pub fn create_channels(
        &self,
        config: &NotifyConfig,
    ) -> Result<Vec<Arc<dyn NotificationChannel>>> {
        self.channels
            .values()
            .map(|factory| factory.create(config).map(Arc::from))
            .collect()
    }
}
