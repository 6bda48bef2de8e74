//! cache_generations tool implementation.

use offgrid_core::{GenerationNames, Network, cache::GenerationInfo};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::AppState;
use crate::tools::json_result;

/// Output from the cache_generations tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGenerationsOutput {
    /// Generations owned by the running version.
    pub active: GenerationNames,
    /// Every generation in the store with its entry count.
    pub generations: Vec<GenerationInfo>,
}

pub async fn generations<N: Network>(state: &AppState<N>) -> Result<CacheGenerationsOutput, ToolError> {
    let manager = state.engine.generations();
    let generations = manager.db().describe_generations().await?;
    Ok(CacheGenerationsOutput { active: manager.names().clone(), generations })
}

/// Implementation of the cache_generations tool.
pub async fn generations_impl<N: Network>(state: &AppState<N>) -> Result<CallToolResult, McpError> {
    let output = generations(state).await?;
    Ok(json_result(&output)?)
}
