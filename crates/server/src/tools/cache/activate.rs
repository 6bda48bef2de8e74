//! cache_activate tool implementation.
//!
//! Deletes every generation that does not belong to the current version.

use offgrid_core::Network;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::AppState;
use crate::tools::json_result;

/// Output from the cache_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheActivateOutput {
    /// Active asset generation.
    pub asset: String,
    /// Active api generation.
    pub api: String,
    /// Stale generations removed by this run.
    pub deleted: Vec<String>,
}

pub async fn activate<N: Network>(state: &AppState<N>) -> Result<CacheActivateOutput, ToolError> {
    let generations = state.engine.generations();
    let deleted = generations.activate_prune().await?;
    let names = generations.names();

    Ok(CacheActivateOutput { asset: names.asset.clone(), api: names.api.clone(), deleted })
}

/// Implementation of the cache_activate tool.
pub async fn activate_impl<N: Network>(state: &AppState<N>) -> Result<CallToolResult, McpError> {
    let output = activate(state).await?;
    Ok(json_result(&output)?)
}
