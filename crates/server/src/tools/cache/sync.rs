//! cache_sync tool implementation.
//!
//! Announces a finished background sync to connected clients. Running the
//! sync itself is up to the caller.

use offgrid_core::Network;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSyncParams {
    /// Sync registration tag, e.g. `sync-data`.
    pub tag: String,
}

/// Output from the cache_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSyncOutput {
    pub tag: String,
}

pub fn sync<N: Network>(state: &AppState<N>, params: CacheSyncParams) -> Result<CacheSyncOutput, ToolError> {
    let tag = params.tag.trim();
    if tag.is_empty() {
        return Err(ToolError::InvalidInput("tag cannot be empty".into()));
    }
    state.engine.generations().announce_sync(tag);
    Ok(CacheSyncOutput { tag: tag.to_string() })
}

/// Implementation of the cache_sync tool.
pub fn sync_impl<N: Network>(state: &AppState<N>, params: CacheSyncParams) -> Result<CallToolResult, McpError> {
    let output = sync(state, params)?;
    Ok(json_result(&output)?)
}
