//! Intercepted requests and their cache identities.

pub mod url;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use self::url::{UrlError, normalize};

use crate::Error;

/// How the request was issued by the page.
///
/// Only `Navigate` influences strategy selection; the other modes are
/// carried so they can be forwarded unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct Request {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Normalized absolute URL.
    pub url: ::url::Url,
    pub mode: RequestMode,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl Request {
    /// Build a request, normalizing method and URL.
    ///
    /// Relative URLs resolve against `origin`.
    pub fn new(method: &str, url: &str, mode: RequestMode, origin: &::url::Url) -> Result<Self, Error> {
        let method = method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(Error::InvalidInput("method cannot be empty".into()));
        }
        let url = normalize(url, origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { method, url, mode, headers: Vec::new(), body: None })
    }

    /// GET request for an already-normalized URL.
    pub fn from_url(url: ::url::Url, mode: RequestMode) -> Self {
        Self { method: "GET".into(), url, mode, headers: Vec::new(), body: None }
    }

    /// Shorthand for a GET request.
    pub fn get(url: &str, mode: RequestMode, origin: &::url::Url) -> Result<Self, Error> {
        Self::new("GET", url, mode, origin)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Cache identity of this request, if it is cacheable at all.
    pub fn identity(&self) -> Option<RequestIdentity> {
        self.is_get()
            .then(|| RequestIdentity { method: self.method.clone(), url: self.url.to_string() })
    }
}

/// Normalized (method, URL) pair used as a cache key.
///
/// Only GET identities exist; see [`Request::identity`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RequestIdentity {
    pub method: String,
    pub url: String,
}

impl RequestIdentity {
    /// GET identity for an already-normalized URL.
    pub fn get(url: &::url::Url) -> Self {
        Self { method: "GET".into(), url: url.to_string() }
    }

    /// Stable storage key for this identity.
    pub fn key_hash(&self) -> String {
        crate::cache::hash::compute_identity_key(&self.method, &self.url)
    }
}

impl std::fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
