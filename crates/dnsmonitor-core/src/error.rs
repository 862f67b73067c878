//! Error types for the DNS monitor
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DNS monitor
#[derive(Error, Debug)]
pub enum Error {
    /// A target token on the command line is not a usable domain
    #[error("Not a valid domain: {0}")]
    InvalidTarget(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// DNS resolution errors
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Notification channel errors
    #[error("Notification error ({channel}): {message}")]
    Notification {
        /// Channel name
        channel: String,
        /// Error message
        message: String,
    },

    /// JSON deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid target error
    pub fn invalid_target(target: impl Into<String>) -> Self {
        Self::InvalidTarget(target.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a channel-specific notification error
    pub fn notification(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notification {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_target_message_names_the_token() {
        let err = Error::invalid_target("bad");
        assert_eq!(err.to_string(), "Not a valid domain: bad");
    }

    #[test]
    fn notification_error_carries_channel() {
        let err = Error::notification("gotify", "connection refused");
        assert_eq!(
            err.to_string(),
            "Notification error (gotify): connection refused"
        );
    }

    #[test]
    fn json_errors_convert_with_question_mark() {
        fn parse(text: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(text)?)
        }

        let err = parse("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error: "));
    }
}
