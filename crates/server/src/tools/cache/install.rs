//! cache_install tool implementation.
//!
//! Populates the asset generation from the precache manifest.

use offgrid_core::Network;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_install tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheInstallParams {
    /// Prune stale generations after a successful install.
    #[serde(default)]
    pub activate: bool,
}

/// Output from the cache_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInstallOutput {
    /// Asset generation that received the manifest.
    pub generation: String,
    /// Number of manifest entries stored.
    pub stored: usize,
    pub manifest: Vec<String>,
    /// Generations pruned, when `activate` was requested.
    pub deleted: Option<Vec<String>>,
}

/// Fetch the whole manifest; nothing is stored unless every fetch succeeds.
pub async fn install<N: Network>(
    state: &AppState<N>, params: CacheInstallParams,
) -> Result<CacheInstallOutput, ToolError> {
    let generations = state.engine.generations();
    let stored = generations.install_populate(state.engine.network(), &state.manifest).await?;

    let deleted = if params.activate { Some(generations.activate_prune().await?) } else { None };

    Ok(CacheInstallOutput {
        generation: generations.names().asset.clone(),
        stored,
        manifest: state.manifest.iter().map(ToString::to_string).collect(),
        deleted,
    })
}

/// Implementation of the cache_install tool.
pub async fn install_impl<N: Network>(
    state: &AppState<N>, params: CacheInstallParams,
) -> Result<CallToolResult, McpError> {
    let output = install(state, params).await?;
    Ok(json_result(&output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{StubNetwork, state};
    use offgrid_core::Error;

    #[tokio::test]
    async fn test_install_stores_manifest() {
        let network = StubNetwork::default()
            .route("https://app.test/", 200, "<html></html>")
            .route("https://app.test/app.css", 200, "body{}");
        let state = state(network).await;

        let output = install(&state, CacheInstallParams::default()).await.unwrap();
        assert_eq!(output.generation, "app-v1");
        assert_eq!(output.stored, 2);
        assert_eq!(output.manifest, vec!["https://app.test/", "https://app.test/app.css"]);
        assert!(output.deleted.is_none());

        let generations = state.engine.generations();
        let keys = generations.db().entry_keys(generations.assets()).await.unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_install_failure_stores_nothing() {
        let network = StubNetwork::default().route("https://app.test/", 200, "<html></html>");
        let state = state(network).await;

        let result = install(&state, CacheInstallParams { activate: true }).await;
        assert!(matches!(
            result,
            Err(ToolError::Core(Error::InstallFailed { url, .. })) if url == "https://app.test/app.css"
        ));

        let generations = state.engine.generations();
        let keys = generations.db().entry_keys(generations.assets()).await.unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_install_then_activate() {
        let network = StubNetwork::default()
            .route("https://app.test/", 200, "<html></html>")
            .route("https://app.test/app.css", 200, "body{}");
        let state = state(network).await;
        state.engine.generations().db().open_generation("app-v0").await.unwrap();

        let output = install(&state, CacheInstallParams { activate: true }).await.unwrap();
        assert_eq!(output.deleted, Some(vec!["app-v0".to_string()]));
    }
}
