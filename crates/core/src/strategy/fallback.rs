//! Responses synthesized when neither the network nor a cache can answer.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::response::{Response, ResponseSource};

pub const SERVICE_UNAVAILABLE: u16 = 503;

const ASSET_OFFLINE_BODY: &str = "resource not available offline";
const NETWORK_ERROR_BODY: &str = "network error";

#[derive(Serialize)]
struct OfflineApiBody<'a> {
    error: &'a str,
    #[serde(rename = "isMock")]
    is_mock: bool,
    timestamp: String,
}

/// 503 JSON body for an API call with no network and no cached copy.
pub fn api_offline(now: DateTime<Utc>) -> Response {
    let body = OfflineApiBody {
        error: "you are offline",
        is_mock: true,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    // Serializing a struct of strings and a bool cannot fail.
    let json = serde_json::to_vec(&body).unwrap_or_default();
    synthesized("application/json", json)
}

/// 503 for a static asset that was never cached.
pub fn asset_offline() -> Response {
    synthesized("text/plain", ASSET_OFFLINE_BODY)
}

/// 503 for any other request that could not be answered.
pub fn network_error() -> Response {
    synthesized("text/plain", NETWORK_ERROR_BODY)
}

fn synthesized(content_type: &str, body: impl Into<bytes::Bytes>) -> Response {
    Response::new(
        SERVICE_UNAVAILABLE,
        vec![("content-type".into(), content_type.into())],
        body,
        ResponseSource::Fallback,
    )
}
