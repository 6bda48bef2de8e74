//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFGRID_*)
//! 2. TOML config file (if OFFGRID_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

use crate::cache::GenerationNames;
use crate::classify::Classifier;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFGRID_*)
/// 2. TOML config file (if OFFGRID_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name; prefix of both generation names.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Deployed version. Changing it renames both generations, so the next
    /// activation prunes the old ones.
    #[serde(default = "default_version")]
    pub version: String,

    /// Origin that relative request URLs and precache paths resolve against.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite cache database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Path fragment marking API requests.
    #[serde(default = "default_api_marker")]
    pub api_marker: String,

    /// File extensions served cache-first.
    ///
    /// Set via OFFGRID_STATIC_EXTENSIONS as a TOML-style array.
    #[serde(default = "default_static_extensions")]
    pub static_extensions: Vec<String>,

    /// Path fragment marking icon requests, served cache-first.
    #[serde(default = "default_icons_marker")]
    pub icons_marker: String,

    /// Resources fetched into the asset generation at install.
    ///
    /// Must include the root document `/`.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
}

fn default_app_name() -> String {
    "app".into()
}

fn default_version() -> String {
    "1".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offgrid-cache.sqlite")
}

fn default_user_agent() -> String {
    "offgrid/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_api_marker() -> String {
    "/api/".into()
}

fn default_static_extensions() -> Vec<String> {
    [".css", ".js", ".mjs", ".woff", ".woff2", ".ttf", ".otf", ".eot"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_icons_marker() -> String {
    "/icons/".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/manifest.json", "/icons/icon-192x192.png", "/icons/icon-512x512.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            version: default_version(),
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            api_marker: default_api_marker(),
            static_extensions: default_static_extensions(),
            icons_marker: default_icons_marker(),
            precache: default_precache(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFGRID_`
    /// 2. TOML file from `OFFGRID_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFGRID_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFGRID_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme {other}") }),
        }
    }

    /// Generation names for the configured app and version.
    pub fn generation_names(&self) -> GenerationNames {
        GenerationNames::for_version(&self.app_name, &self.version)
    }

    /// Classifier built from the configured markers and extensions.
    pub fn classifier(&self) -> Classifier {
        Classifier::new(&self.api_marker, &self.static_extensions, &self.icons_marker)
    }

    /// Precache manifest resolved against the origin, in configured order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin or any entry is not a
    /// valid URL.
    pub fn precache_urls(&self) -> Result<Vec<Url>, ConfigError> {
        let origin = self.origin_url()?;
        self.precache
            .iter()
            .map(|entry| {
                crate::request::normalize(entry, &origin)
                    .map_err(|e| ConfigError::Invalid { field: "precache".into(), reason: format!("{entry}: {e}") })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app_name, "app");
        assert_eq!(config.version, "1");
        assert_eq!(config.db_path, PathBuf::from("./offgrid-cache.sqlite"));
        assert_eq!(config.user_agent, "offgrid/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.api_marker, "/api/");
        assert!(config.precache.contains(&"/".to_string()));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_generation_names() {
        let config = AppConfig { app_name: "notes".into(), version: "7".into(), ..Default::default() };
        let names = config.generation_names();
        assert_eq!(names.asset, "notes-v7");
        assert_eq!(names.api, "notes-api-v7");
    }

    #[test]
    fn test_precache_urls_resolved() {
        let config = AppConfig {
            origin: "https://notes.example".into(),
            precache: vec!["/".into(), "/manifest.json".into(), "https://fonts.example/inter.css".into()],
            ..Default::default()
        };
        let urls: Vec<String> = config.precache_urls().unwrap().iter().map(Url::to_string).collect();
        assert_eq!(
            urls,
            vec![
                "https://notes.example/".to_string(),
                "https://notes.example/manifest.json".to_string(),
                "https://fonts.example/inter.css".to_string(),
            ]
        );
    }

    #[test]
    fn test_origin_url_rejects_scheme() {
        let config = AppConfig { origin: "ftp://example.com".into(), ..Default::default() };
        assert!(matches!(config.origin_url(), Err(ConfigError::Invalid { field, .. }) if field == "origin"));
    }

    #[test]
    fn test_classifier_from_config() {
        let config = AppConfig { api_marker: "/rpc/".into(), ..Default::default() };
        let origin = config.origin_url().unwrap();
        let request = crate::request::Request::get("/rpc/call", Default::default(), &origin).unwrap();
        assert_eq!(config.classifier().classify(&request), crate::classify::RequestClass::Api);
    }
}
