//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use offgrid_client::FetchClient;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::state::AppState;
use crate::tools::cache::{
    CacheGetParams, CacheInstallParams, CacheSyncParams, activate_impl, generations_impl, get_impl, install_impl,
    sync_impl,
};
use crate::tools::web_fetch::{WebFetchParams, fetch_impl};

/// The main MCP server handler for offgrid.
#[derive(Clone)]
pub struct OffgridServer {
    tool_router: ToolRouter<Self>,
    state: Arc<AppState<FetchClient>>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl OffgridServer {
    /// Create a new server handler.
    pub fn new(state: AppState<FetchClient>) -> Self {
        Self { tool_router: Self::tool_router(), state: Arc::new(state) }
    }

    /// Run a request through the offline-first engine.
    ///
    /// GET requests are classified and answered from the network or the
    /// cache generations; other methods pass straight through.
    #[tool(
        description = "Fetch a URL through the offline-first cache. GET requests are served network-first or cache-first by class; other methods pass through. Returns status, headers, body, class, and source."
    )]
    async fn web_fetch(&self, params: Parameters<WebFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(self.state.as_ref(), params.0).await
    }

    #[tool(
        description = "Fetch every precache manifest URL into the asset generation. All-or-nothing: one failed fetch stores nothing. Optionally activate afterwards."
    )]
    async fn cache_install(&self, params: Parameters<CacheInstallParams>) -> Result<CallToolResult, McpError> {
        install_impl(self.state.as_ref(), params.0).await
    }

    #[tool(description = "Delete every cache generation that does not belong to the current version.")]
    async fn cache_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(self.state.as_ref()).await
    }

    #[tool(description = "List cache generations with entry counts and the currently active pair.")]
    async fn cache_generations(&self) -> Result<CallToolResult, McpError> {
        generations_impl(self.state.as_ref()).await
    }

    #[tool(description = "Look up the cached response for a GET URL in a named generation.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(self.state.as_ref(), params.0).await
    }

    #[tool(description = "Tell connected clients that a background sync run finished.")]
    async fn cache_sync(&self, params: Parameters<CacheSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(self.state.as_ref(), params.0)
    }
}

impl ServerHandler for OffgridServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offgrid".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
