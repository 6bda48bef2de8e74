//! Request classification.
//!
//! Maps a request to the strategy that will fulfill it, looking only at its
//! method, URL path, and mode. Checks run in a fixed order and the first
//! match wins.

use serde::{Deserialize, Serialize};

use crate::request::{Request, RequestMode};

/// Class of a cacheable request; selects the fulfillment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    /// Dynamic API call: network-first, api generation.
    Api,
    /// Stylesheets, scripts, fonts, icons: cache-first, asset generation.
    StaticAsset,
    /// Document load: network-first, falls back to the root document.
    Navigation,
    /// Everything else: network-first, asset generation.
    Default,
}

/// Result of the GET pre-filter plus classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Not eligible for caching; forward to the network untouched.
    Bypass,
    Fulfill(RequestClass),
}

/// Stateless request classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    api_marker: String,
    static_extensions: Vec<String>,
    icons_marker: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            "/api/",
            [".css", ".js", ".mjs", ".woff", ".woff2", ".ttf", ".otf", ".eot"],
            "/icons/",
        )
    }
}

impl Classifier {
    /// Build a classifier. Extensions are matched case-insensitively.
    pub fn new<I, S>(api_marker: impl Into<String>, static_extensions: I, icons_marker: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            api_marker: api_marker.into(),
            static_extensions: static_extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_ascii_lowercase())
                .collect(),
            icons_marker: icons_marker.into(),
        }
    }

    /// Apply the GET pre-filter, then classify.
    pub fn route(&self, request: &Request) -> Route {
        if request.is_get() { Route::Fulfill(self.classify(request)) } else { Route::Bypass }
    }

    /// Classify a request by shape alone.
    ///
    /// Total: every request maps to exactly one class. Callers are expected
    /// to have dropped non-GET requests via [`Classifier::route`].
    pub fn classify(&self, request: &Request) -> RequestClass {
        let path = request.url.path();

        if path.contains(&self.api_marker) {
            RequestClass::Api
        } else if self.is_static_asset(path) {
            RequestClass::StaticAsset
        } else if request.mode == RequestMode::Navigate {
            RequestClass::Navigation
        } else {
            RequestClass::Default
        }
    }

    fn is_static_asset(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        self.static_extensions.iter().any(|ext| lower.ends_with(ext.as_str())) || path.contains(&self.icons_marker)
    }
}
