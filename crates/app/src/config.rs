//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PLATEFUL_PROJECT_ID` - Hosted backend project identifier
//! - `PLATEFUL_API_KEY` - Backend API key (secret)
//!
//! ## Optional
//! - `PLATEFUL_USERS_COLLECTION` - Profile collection name (default: users)
//! - `PLATEFUL_NOTIFICATION_CHANNEL_ID` - Channel id (default: default-channel-id)
//! - `PLATEFUL_NOTIFICATION_CHANNEL_NAME` - Channel name (default: Default Channel)

use secrecy::SecretString;
use thiserror::Error;

use crate::providers::NotificationChannel;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AppConfig {
    /// Hosted backend project identifier.
    pub project_id: String,
    /// Backend API key.
    pub api_key: SecretString,
    /// Name of the user-profile collection.
    pub users_collection: String,
    /// The channel local notifications are displayed on.
    pub notification_channel: NotificationChannel,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("users_collection", &self.users_collection)
            .field("notification_channel", &self.notification_channel)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` for absent required variables
    /// and `ConfigError::InvalidEnvVar` for non-UTF-8 values.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            project_id: require("PLATEFUL_PROJECT_ID")?,
            api_key: SecretString::from(require("PLATEFUL_API_KEY")?),
            users_collection: optional("PLATEFUL_USERS_COLLECTION", "users")?,
            notification_channel: NotificationChannel {
                id: optional("PLATEFUL_NOTIFICATION_CHANNEL_ID", "default-channel-id")?,
                name: optional("PLATEFUL_NOTIFICATION_CHANNEL_NAME", "Default Channel")?,
                description: "A default channel for notifications".to_owned(),
            },
        })
    }

    /// A configuration suitable for tests and local development.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            project_id: "plateful-test".to_owned(),
            api_key: SecretString::from("test-api-key"),
            users_collection: "users".to_owned(),
            notification_channel: NotificationChannel {
                id: "default-channel-id".to_owned(),
                name: "Default Channel".to_owned(),
                description: "A default channel for notifications".to_owned(),
            },
        }
    }
}

fn require(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) | Err(std::env::VarError::NotPresent) => {
            Err(ConfigError::MissingEnvVar(name.to_owned()))
        }
        Err(error) => Err(ConfigError::InvalidEnvVar(name.to_owned(), error.to_string())),
    }
}

fn optional(name: &str, default: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) | Err(std::env::VarError::NotPresent) => Ok(default.to_owned()),
        Err(error) => Err(ConfigError::InvalidEnvVar(name.to_owned(), error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AppConfig::for_testing();
        let debug = format!("{config:?}");
        assert!(!debug.contains("test-api-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_testing_defaults() {
        let config = AppConfig::for_testing();
        assert_eq!(config.users_collection, "users");
        assert_eq!(config.notification_channel.id, "default-channel-id");
    }
}
