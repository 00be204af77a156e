//! Asynchronous MCP session over a child-process transport.

use serde_json::Value;

use crate::error::{McpError, Result};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcNotification,
    JsonRpcRequest, ListToolsResult, ServerInfo, ToolInfo,
};
use crate::transport::{Framing, McpTransport};

/// How to launch an MCP server process.
#[derive(Debug, Clone)]
pub struct ServerParameters {
    /// Display name used in logs and thread names.
    pub name: String,
    /// Command to spawn.
    pub command: String,
    /// Arguments to pass to the command.
    pub args: Vec<String>,
    /// Environment variables set on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Wire framing the server speaks.
    pub framing: Framing,
}

impl ServerParameters {
    /// Create parameters for a server with no arguments.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
            framing: Framing::default(),
        }
    }

    /// Replace the argument list.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Add an argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add an environment variable.
    pub fn with_env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the wire framing.
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }
}

/// A live, initialized MCP session.
///
/// Requests are strictly sequential: each call writes one request and reads
/// until the matching response arrives.
pub struct McpSession {
    name: String,
    transport: McpTransport,
    server_info: ServerInfo,
    next_id: u64,
}

impl McpSession {
    /// Spawn the server and perform the initialize handshake.
    ///
    /// Spawn failures surface as [`McpError::SpawnFailed`]; anything that goes
    /// wrong during the handshake surfaces as [`McpError::Handshake`].
    pub async fn start(params: &ServerParameters) -> Result<Self> {
        let transport =
            McpTransport::spawn(&params.command, &params.args, &params.env, params.framing)?;

        tracing::info!(
            server = %params.name,
            command = %params.command,
            "connected to MCP server via stdio"
        );

        let mut session = Self {
            name: params.name.clone(),
            transport,
            server_info: ServerInfo {
                name: String::new(),
                version: String::new(),
            },
            next_id: 1,
        };

        match session.initialize().await {
            Ok(info) => {
                session.server_info = info;
                Ok(session)
            }
            Err(e) => {
                if let Err(shutdown_err) = session.transport.shutdown().await {
                    tracing::warn!(
                        server = %session.name,
                        error = %shutdown_err,
                        "failed to reap MCP server after handshake failure"
                    );
                }
                Err(McpError::handshake(e.to_string()))
            }
        }
    }

    /// Server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Server info reported during the handshake.
    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// OS process id of the server.
    pub fn process_id(&self) -> Option<u32> {
        self.transport.process_id()
    }

    async fn initialize(&mut self) -> Result<ServerInfo> {
        let params = InitializeParams::default();
        let result = self
            .send_request("initialize", Some(serde_json::to_value(&params)?))
            .await?;

        let init_result: InitializeResult = serde_json::from_value(result)?;

        tracing::info!(
            server = %init_result.server_info.name,
            version = %init_result.server_info.version,
            protocol = %init_result.protocol_version,
            "MCP server initialized"
        );

        self.send_notification("notifications/initialized", None)
            .await?;

        Ok(init_result.server_info)
    }

    async fn send_request(&mut self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = JsonRpcRequest::new(id, method, params);
        self.transport.send_request(&request).await?;

        loop {
            let message = self.transport.receive().await?;
            if message.answers(id) {
                return message
                    .into_result()
                    .map_err(|e| McpError::server_error(e.code, e.message, e.data));
            }

            tracing::trace!(
                server = %self.name,
                expected_id = id,
                id = ?message.id,
                method = ?message.method,
                "skipping unrelated MCP message"
            );
        }
    }

    async fn send_notification(&mut self, method: &str, params: Option<Value>) -> Result<()> {
        let notification = JsonRpcNotification::new(method, params);
        self.transport.send_notification(&notification).await
    }

    /// List available tools from the server.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolInfo>> {
        let result = self.send_request("tools/list", None).await?;
        let list_result: ListToolsResult = serde_json::from_value(result)?;

        if list_result.next_cursor.is_some() {
            tracing::debug!(server = %self.name, "ignoring further pages of tools/list");
        }

        tracing::debug!(
            server = %self.name,
            tool_count = list_result.tools.len(),
            "listed MCP tools"
        );

        Ok(list_result.tools)
    }

    /// Call a tool on the server.
    pub async fn call_tool(&mut self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };

        let result = self
            .send_request("tools/call", Some(serde_json::to_value(&params)?))
            .await?;
        let call_result: CallToolResult = serde_json::from_value(result)?;

        if call_result.is_error() {
            tracing::warn!(server = %self.name, tool = %name, "tool call returned error");
        } else {
            tracing::debug!(server = %self.name, tool = %name, "tool call succeeded");
        }

        Ok(call_result)
    }

    /// Close the session and reap the server process.
    pub async fn shutdown(mut self) -> Result<()> {
        tracing::info!(server = %self.name, "shutting down MCP session");
        self.transport.shutdown().await
    }
}
