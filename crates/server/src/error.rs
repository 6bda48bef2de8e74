//! Structured errors for the offgrid MCP tools.
//!
//! Engine failures keep the codes assigned in `offgrid_core::Error`; the
//! variants here cover tool-level parameter problems.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Errors raised while running a tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid input parameters (e.g., a body on a GET request).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The named generation does not exist.
    #[error("UNKNOWN_GENERATION: {0}")]
    UnknownGeneration(String),

    /// Tool output could not be encoded.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] offgrid_core::Error),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match err {
            ToolError::Core(inner) => return inner.into(),
            ToolError::InvalidInput(msg) => (-32602, msg),
            ToolError::UnknownGeneration(name) => (-32004, format!("no generation named {name}")),
            ToolError::Serialize(e) => (-32000, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_keeps_code() {
        let err = ToolError::from(offgrid_core::Error::CacheMiss("GET https://app.test/".into()));
        let mcp: McpError = err.into();
        assert_eq!(mcp.code, ErrorCode(-32001));
    }

    #[test]
    fn test_tool_error_codes() {
        let mcp: McpError = ToolError::InvalidInput("url cannot be empty".into()).into();
        assert_eq!(mcp.code, ErrorCode(-32602));
        assert_eq!(mcp.message, "url cannot be empty");

        let mcp: McpError = ToolError::UnknownGeneration("app-v0".into()).into();
        assert_eq!(mcp.code, ErrorCode(-32004));
        assert_eq!(mcp.message, "no generation named app-v0");
    }
}
