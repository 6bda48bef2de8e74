//! Responses produced by fulfillment.
//!
//! The body is an immutable `Bytes` buffer, so a response that is both
//! returned and stored is duplicated by cloning the wrapper; nothing is ever
//! read twice from a stream.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Live network response.
    Network,
    /// Served from a cache generation.
    Cache,
    /// Synthesized because neither network nor cache could answer.
    Fallback,
    /// Non-GET request forwarded without touching the caches.
    Passthrough,
}

/// A complete HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub source: ResponseSource,
}

impl Response {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>, source: ResponseSource) -> Self {
        Self { status, headers, body: body.into(), source }
    }

    /// Status in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Same response relabelled with another source.
    pub fn with_source(mut self, source: ResponseSource) -> Self {
        self.source = source;
        self
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ok_range() {
        let mk = |status| Response::new(status, Vec::new(), "", ResponseSource::Network);
        assert!(mk(200).is_ok());
        assert!(mk(204).is_ok());
        assert!(mk(299).is_ok());
        assert!(!mk(199).is_ok());
        assert!(!mk(301).is_ok());
        assert!(!mk(404).is_ok());
        assert!(!mk(503).is_ok());
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let response = Response::new(
            200,
            vec![("Content-Type".into(), "text/css".into())],
            "body{}",
            ResponseSource::Network,
        );
        assert_eq!(response.content_type(), Some("text/css"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_clone_shares_body() {
        let response = Response::new(200, Vec::new(), Bytes::from_static(b"shared"), ResponseSource::Network);
        let copy = response.clone().with_source(ResponseSource::Cache);
        assert_eq!(copy.body, response.body);
        assert_eq!(copy.body.as_ptr(), response.body.as_ptr());
        assert_eq!(copy.source, ResponseSource::Cache);
    }
}
