//! Error types for the agent crate.

use medassist_llm::LlmError;
use medassist_mcp::McpError;
use thiserror::Error;

/// Result type alias using the agent error type.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for orchestration.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Completion endpoint error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// The model called a tool that is not in the registry.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool invocation failed.
    #[error("Tool '{tool}' failed: {source}")]
    ToolExecution {
        /// Name of the failing tool.
        tool: String,
        /// Underlying protocol error.
        source: McpError,
    },

    /// The model sent arguments that are not a JSON object.
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments {
        /// Name of the called tool.
        tool: String,
        /// Decode failure.
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Create a tool execution error.
    pub fn tool_execution(tool: impl Into<String>, source: McpError) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable tag for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Llm(_) => "llm",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::ToolExecution { source, .. } if matches!(source, McpError::NotConnected) => {
                "not_connected"
            }
            Self::ToolExecution { .. } => "tool_execution",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_display() {
        let err = AgentError::ToolNotFound("lookup_price".to_string());
        assert!(err.to_string().contains("Tool not found"));
        assert!(err.to_string().contains("lookup_price"));
        assert_eq!(err.kind(), "tool_not_found");
    }

    #[test]
    fn test_tool_execution_keeps_source() {
        let err = AgentError::tool_execution(
            "lookup_price",
            McpError::tool_execution("lookup_price", "result has no text content"),
        );
        assert!(err.to_string().contains("lookup_price"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.kind(), "tool_execution");

        let err = AgentError::tool_execution("lookup_price", McpError::NotConnected);
        assert_eq!(err.kind(), "not_connected");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            AgentError::from(LlmError::Auth("bad key".into())).kind(),
            "llm"
        );
        assert_eq!(
            AgentError::InvalidArguments {
                tool: "lookup_price".into(),
                message: "expected an object".into(),
            }
            .kind(),
            "invalid_arguments"
        );
        assert_eq!(AgentError::internal("runtime").kind(), "internal");
    }
}
