//! cache_get tool implementation.
//!
//! Looks up a stored response by URL in a named generation.

use offgrid_core::{Error, Network, RequestIdentity, request::normalize};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Generation to search, e.g. `app-v1` or `app-api-v1`.
    pub generation: String,
    /// URL of the cached GET request; relative paths resolve against the origin.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub generation: String,
    /// Request identity, `METHOD url`.
    pub key: String,
    pub key_hash: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Find the entry for `params.url` in `params.generation`.
pub async fn get<N: Network>(state: &AppState<N>, params: CacheGetParams) -> Result<CacheGetOutput, ToolError> {
    let url = normalize(&params.url, &state.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let db = state.engine.generations().db();

    let handle = db
        .existing_generation(&params.generation)
        .await?
        .ok_or_else(|| ToolError::UnknownGeneration(params.generation.clone()))?;

    let identity = RequestIdentity::get(&url);
    let response = db
        .match_entry(&handle, &identity)
        .await?
        .ok_or_else(|| Error::CacheMiss(identity.to_string()))?;

    Ok(CacheGetOutput {
        generation: params.generation,
        key: identity.to_string(),
        key_hash: identity.key_hash(),
        status: response.status,
        content_type: response.content_type().map(str::to_string),
        body: response.text(),
        headers: response.headers,
    })
}

/// Implementation of the cache_get tool.
pub async fn get_impl<N: Network>(state: &AppState<N>, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let output = get(state, params).await?;
    Ok(json_result(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubNetwork, state};
    use offgrid_core::{Response, ResponseSource};

    #[tokio::test]
    async fn test_get_unknown_generation() {
        let state = state(StubNetwork::default()).await;
        let params = CacheGetParams { generation: "app-v0".into(), url: "/".into() };

        let result = get(&state, params).await;
        assert!(matches!(result, Err(ToolError::UnknownGeneration(name)) if name == "app-v0"));
    }

    #[tokio::test]
    async fn test_get_missing_entry() {
        let state = state(StubNetwork::default()).await;
        let params = CacheGetParams { generation: "app-v1".into(), url: "/app.css".into() };

        let result = get(&state, params).await;
        assert!(matches!(result, Err(ToolError::Core(Error::CacheMiss(_)))));
    }

    #[tokio::test]
    async fn test_get_found() {
        let state = state(StubNetwork::default()).await;
        let generations = state.engine.generations();
        let url = state.origin.join("/api/items?page=2").unwrap();
        let stored = Response::new(
            200,
            vec![("content-type".into(), "application/json".into())],
            "[1,2]",
            ResponseSource::Network,
        );
        generations.db().put_entry(generations.api(), &RequestIdentity::get(&url), &stored).await.unwrap();

        let params = CacheGetParams { generation: "app-api-v1".into(), url: "/api/items?page=2#top".into() };
        let output = get(&state, params).await.unwrap();

        assert_eq!(output.key, "GET https://app.test/api/items?page=2");
        assert_eq!(output.status, 200);
        assert_eq!(output.content_type.as_deref(), Some("application/json"));
        assert_eq!(output.body, "[1,2]");
    }

    #[tokio::test]
    async fn test_get_impl_missing() {
        let state = state(StubNetwork::default()).await;
        let params = CacheGetParams { generation: "app-v1".into(), url: "/nope".into() };

        let result = get_impl(&state, params).await;
        assert!(result.is_err());
    }
}
