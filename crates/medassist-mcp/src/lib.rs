//! Blocking MCP (Model Context Protocol) client for MedAssist.
//!
//! MCP servers run as child processes and speak JSON-RPC 2.0 over stdio. This
//! crate drives that protocol asynchronously on a private worker thread and
//! exposes a synchronous handle to the rest of the application.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  SyncMcpClient / McpToolInvoker                             │
//! │  - Blocking open / list_tools / invoke / close              │
//! │  - Commands sent to a dedicated worker thread               │
//! └─────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpSession (current-thread tokio runtime)                  │
//! │  - initialize handshake, tools/list, tools/call             │
//! └─────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  McpTransport                                               │
//! │  - Newline-delimited or Content-Length framed JSON          │
//! │  - Child process with kill_on_drop                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use medassist_mcp::{ServerParameters, SyncMcpClient};
//!
//! let params = ServerParameters::new("eka", "uvx")
//!     .with_arg("eka_mcp_server")
//!     .with_arg("--eka-api-host")
//!     .with_arg("https://api.eka.care");
//!
//! let mut client = SyncMcpClient::connect(params)?;
//! for tool in client.list_tools()? {
//!     println!("{}: {:?}", tool.name, tool.description);
//! }
//!
//! let lookup = client.invoker("lookup_price")?;
//! let mut args = serde_json::Map::new();
//! args.insert("drug".into(), "Paracetamol".into());
//! println!("{}", lookup.invoke(&args)?);
//!
//! client.close()?;
//! ```
//!
//! The protocol flow is:
//! 1. Client sends `initialize` with capabilities
//! 2. Server responds with its capabilities
//! 3. Client sends `notifications/initialized`
//! 4. Client can now call `tools/list` and `tools/call`

pub mod adapter;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-export main types
pub use adapter::{McpToolInvoker, SyncMcpClient, with_client};
pub use error::{McpError, Result};
pub use protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities,
    ServerInfo, ToolContent, ToolInfo, ToolsCapability,
};
pub use session::{McpSession, ServerParameters};
pub use transport::{Framing, McpTransport};
