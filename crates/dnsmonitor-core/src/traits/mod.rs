//! Core traits for the DNS monitor
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`Resolver`]: Perform a single DNS query of a given type
//! - [`NotificationChannel`]: Deliver a notification to an external service

pub mod channel;
pub mod resolver;

pub use channel::{Notification, NotificationChannel, NotificationChannelFactory, Priority};
pub use resolver::{Resolver, resolve};
