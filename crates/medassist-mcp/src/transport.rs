//! Stdio transport for MCP communication.
//!
//! Local MCP servers are child processes. Messages travel over the child's
//! stdin/stdout, either one JSON document per line (the MCP stdio default)
//! or with LSP-style `Content-Length` headers.

use std::process::Stdio;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::{McpError, Result};
use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// How messages are delimited on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// One JSON document per line.
    #[default]
    NewlineDelimited,
    /// `Content-Length: N\r\n\r\n` header followed by N bytes of JSON.
    ContentLength,
}

impl FromStr for Framing {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "newline" | "newline_delimited" | "ndjson" => Ok(Self::NewlineDelimited),
            "content_length" | "lsp" => Ok(Self::ContentLength),
            other => Err(McpError::protocol(format!("unknown framing '{}'", other))),
        }
    }
}

/// Transport to a child-process MCP server.
///
/// The child is spawned with `kill_on_drop`, so dropping the transport never
/// leaves an orphan behind even if [`McpTransport::shutdown`] was skipped.
pub struct McpTransport {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    framing: Framing,
}

impl McpTransport {
    /// Spawn a new stdio transport.
    ///
    /// # Arguments
    /// * `command` - The command to spawn (e.g., "uvx")
    /// * `args` - Arguments to pass to the command
    /// * `env` - Environment variables to set on top of the inherited ones
    /// * `framing` - Wire framing the server speaks
    pub fn spawn(
        command: &str,
        args: &[String],
        env: &[(String, String)],
        framing: Framing,
    ) -> Result<Self> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit()) // Let stderr pass through for debugging
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| McpError::spawn_failed(format!("failed to spawn '{}': {}", command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::spawn_failed("failed to capture stdin"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::spawn_failed("failed to capture stdout"))?;

        tracing::debug!(command, pid = ?child.id(), ?framing, "spawned MCP server process");

        Ok(Self {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            framing,
        })
    }

    /// OS process id of the server, or `None` once it has been reaped.
    pub fn process_id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Write a JSON-RPC request.
    pub async fn send_request(&mut self, request: &JsonRpcRequest) -> Result<()> {
        let json = serde_json::to_string(request)?;
        self.write_message(&json).await
    }

    /// Write a JSON-RPC notification.
    pub async fn send_notification(&mut self, notification: &JsonRpcNotification) -> Result<()> {
        let json = serde_json::to_string(notification)?;
        self.write_message(&json).await
    }

    /// Read the next message from the server.
    ///
    /// Returns [`McpError::ConnectionClosed`] when the server closes stdout.
    pub async fn receive(&mut self) -> Result<JsonRpcResponse> {
        let json = match self.framing {
            Framing::NewlineDelimited => self.read_line_message().await?,
            Framing::ContentLength => self.read_framed_message().await?,
        };

        tracing::trace!(json = %json, "received MCP message");

        let message: JsonRpcResponse = serde_json::from_str(&json)?;
        Ok(message)
    }

    async fn write_message(&mut self, json: &str) -> Result<()> {
        match self.framing {
            Framing::NewlineDelimited => {
                self.stdin.write_all(json.as_bytes()).await?;
                self.stdin.write_all(b"\n").await?;
            }
            Framing::ContentLength => {
                let header = format!("Content-Length: {}\r\n\r\n", json.len());
                self.stdin.write_all(header.as_bytes()).await?;
                self.stdin.write_all(json.as_bytes()).await?;
            }
        }
        self.stdin.flush().await?;

        tracing::trace!(content_length = json.len(), json = %json, "sent MCP message");
        Ok(())
    }

    async fn read_line_message(&mut self) -> Result<String> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self.stdout.read_line(&mut line).await?;
            if bytes_read == 0 {
                return Err(McpError::ConnectionClosed);
            }

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
    }

    async fn read_framed_message(&mut self) -> Result<String> {
        let mut content_length: Option<usize> = None;
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = self.stdout.read_line(&mut line).await?;
            if bytes_read == 0 {
                return Err(McpError::ConnectionClosed);
            }

            let trimmed = line.trim();

            // Empty line ends the header block
            if trimmed.is_empty() {
                if content_length.is_some() {
                    break;
                }
                continue;
            }

            if let Some(len_str) = trimmed.strip_prefix("Content-Length:") {
                content_length = Some(len_str.trim().parse().map_err(|e| {
                    McpError::protocol(format!("invalid Content-Length: {}", e))
                })?);
            }
        }

        let content_length =
            content_length.ok_or_else(|| McpError::protocol("missing Content-Length header"))?;

        let mut body = vec![0u8; content_length];
        self.stdout.read_exact(&mut body).await?;

        String::from_utf8(body)
            .map_err(|e| McpError::protocol(format!("invalid UTF-8 in message: {}", e)))
    }

    /// Close stdin, then kill and reap the child process.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Err(e) = self.stdin.shutdown().await {
            tracing::trace!(error = %e, "closing MCP server stdin failed");
        }

        if self.child.try_wait()?.is_none() {
            self.child.kill().await?;
        }

        tracing::debug!("MCP server process reaped");
        Ok(())
    }
}
