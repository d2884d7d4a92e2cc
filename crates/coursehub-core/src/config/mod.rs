//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every field carries a default so an empty file is valid.

pub mod api;
pub mod logging;
pub mod notification;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::api::ApiConfig;
pub use self::logging::LoggingConfig;
pub use self::notification::NotificationConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`COURSEHUB__API__BASE_URL`).
pub const ENV_PREFIX: &str = "COURSEHUB";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend REST API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Session persistence and liveness settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Notification polling settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional. Environment variables prefixed with
    /// `COURSEHUB__` are layered on top.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the background loops cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.session.liveness_interval_seconds == 0 {
            return Err(AppError::configuration(
                "session.liveness_interval_seconds must be greater than zero",
            ));
        }
        if self.notifications.poll_interval_seconds == 0 {
            return Err(AppError::configuration(
                "notifications.poll_interval_seconds must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.session.liveness_interval(), Duration::from_secs(30));
        assert_eq!(config.session.startup_delay(), Duration::from_secs(2));
        assert_eq!(config.session.login_route, "/login");
        assert_eq!(
            config.session.expired_message,
            "Session expired. Please login again."
        );
        assert_eq!(config.notifications.poll_interval(), Duration::from_secs(30));
        assert_eq!(
            config.notifications.reconcile_delay(),
            Duration::from_millis(500)
        );
        assert!(config.notifications.enabled);
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_toml(
            r#"
            [api]
            base_url = "https://learn.example.com/api/"

            [notifications]
            poll_interval_seconds = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://learn.example.com/api/");
        assert_eq!(
            config.api.endpoint("notifications/read"),
            "https://learn.example.com/api/notifications/read"
        );
        assert_eq!(config.notifications.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.notifications.reconcile_delay_ms, 500);
    }

    #[test]
    fn test_zero_intervals_are_rejected() {
        let err = AppConfig::from_toml("[session]\nliveness_interval_seconds = 0").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
        assert!(err.message.contains("liveness_interval_seconds"));

        let err =
            AppConfig::from_toml("[notifications]\npoll_interval_seconds = 0").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
        assert!(err.message.contains("poll_interval_seconds"));
    }

    #[test]
    fn test_load_rejects_zero_interval_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "[notifications]\npoll_interval_seconds = 0\n").unwrap();

        let err = AppConfig::load(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_invalid_type_is_configuration_error() {
        let err = AppConfig::from_toml("[session]\nliveness_interval_seconds = \"soon\"")
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
