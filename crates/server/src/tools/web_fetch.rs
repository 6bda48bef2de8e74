//! web_fetch tool implementation.
//!
//! Runs one request through the engine exactly as an intercepted page
//! request would be handled: GETs are classified and fulfilled from network
//! and caches, everything else passes straight through.

use chrono::Utc;
use offgrid_core::{Network, Request, RequestClass, RequestMode, ResponseSource, Route};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::error::ToolError;
use crate::state::AppState;

/// Input parameters for web_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET). Non-GET requests bypass the caches.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode. `navigate` marks a document load.
    #[serde(default)]
    pub mode: RequestMode,

    /// Extra request headers as name/value pairs.
    #[serde(default)]
    pub headers: Vec<(String, String)>,

    /// Request body. Not allowed on GET.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for web_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebFetchOutput {
    /// Upper-cased method that was sent.
    pub method: String,
    /// Normalized request URL.
    pub url: String,
    /// Strategy class, or null when the request bypassed the caches.
    pub class: Option<RequestClass>,
    pub status: u16,
    /// Where the response came from.
    pub source: ResponseSource,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    /// ISO8601 timestamp of when the response was produced.
    pub fetched_at: String,
}

/// Handle one request through the engine.
pub async fn fetch<N: Network>(state: &AppState<N>, params: WebFetchParams) -> Result<WebFetchOutput, ToolError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()));
    }

    let mut request = Request::new(&params.method, &params.url, params.mode, &state.origin)?;
    if let Some(body) = params.body {
        if request.is_get() {
            return Err(ToolError::InvalidInput("GET requests cannot carry a body".into()));
        }
        request = request.with_body(body);
    }
    for (name, value) in params.headers {
        request = request.with_header(name, value);
    }

    let class = match state.engine.route(&request) {
        Route::Bypass => None,
        Route::Fulfill(class) => Some(class),
    };

    let response = state.engine.handle(&request).await?;

    Ok(WebFetchOutput {
        method: request.method,
        url: request.url.to_string(),
        class,
        status: response.status,
        source: response.source,
        content_type: response.content_type().map(str::to_string),
        body: response.text(),
        headers: response.headers,
        fetched_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    })
}

/// Implementation of the web_fetch tool.
pub async fn fetch_impl<N: Network>(state: &AppState<N>, params: WebFetchParams) -> Result<CallToolResult, McpError> {
    let output = fetch(state, params).await?;
    Ok(json_result(&output)?)
}
