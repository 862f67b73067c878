// # dnsmonitor-core
//
// Core library for the DNS change monitor.
//
// ## Architecture Overview
//
// This library provides the monitoring loop and its building blocks:
// - **Resolver**: Trait for issuing one DNS query of a given type
// - **NotificationChannel**: Trait for delivering a notification to a service
// - **Dispatcher**: Concurrent, failure-isolated fan-out to all channels
// - **Monitor**: Loop that resolves, detects changes and dispatches
// - **ChannelRegistry**: Plugin-based registry for notification channels
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from DNS and HTTP implementations
// 2. **Single Writer**: Only the Monitor mutates domain state
// 3. **Plugin-Based**: Channels are registered dynamically, no hard-coded list
// 4. **Contained Failures**: Resolution and delivery errors never stop the loop

pub mod config;
pub mod detector;
pub mod dispatcher;
pub mod domain;
pub mod engine;
pub mod error;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{MonitorConfig, NotifyConfig};
pub use detector::{Observation, ResolutionResult, classify};
pub use dispatcher::{DispatchHandle, DispatchReport, Dispatcher};
pub use domain::{MonitoredDomain, QueryType, parse_targets};
pub use engine::{CycleSummary, Monitor, MonitorEvent};
pub use error::{Error, Result};
pub use registry::ChannelRegistry;
pub use traits::{Notification, NotificationChannel, Priority, Resolver};
