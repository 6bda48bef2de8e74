//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `app_name`, `version`, `api_marker`, `icons_marker` or `user_agent` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - a precache entry is not a valid URL
    ///
    /// Returns `ConfigError::Missing` if `precache` lacks the root document.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("app_name", &self.app_name),
            ("version", &self.version),
            ("api_marker", &self.api_marker),
            ("icons_marker", &self.icons_marker),
            ("user_agent", &self.user_agent),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        self.origin_url()?;

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.static_extensions.iter().any(|ext| !ext.starts_with('.')) {
            return Err(invalid("static_extensions", "each extension must start with '.'"));
        }

        let urls = self.precache_urls()?;
        let root = self.origin_url()?.join("/").map_err(|e| invalid("origin", &e.to_string()))?;
        if !urls.contains(&root) {
            return Err(ConfigError::Missing {
                field: "precache".into(),
                hint: "include \"/\" so offline navigations can fall back to the root document".into(),
            });
        }

        if self.static_extensions.is_empty() {
            tracing::warn!("static_extensions is empty; only icon paths will be served cache-first");
        }

        Ok(())
    }
}
