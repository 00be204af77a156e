//! Blocking adapter over an asynchronous MCP session.
//!
//! The session lives on a dedicated worker thread that owns a single-threaded
//! tokio runtime. Callers talk to it through an unbounded command channel and
//! block on a oneshot reply, so every public method here is synchronous.
//!
//! ```text
//! ┌────────────────┐   Command + oneshot   ┌──────────────────────┐
//! │ SyncMcpClient  │ ────────────────────► │ mcp-session-<name>   │
//! │ McpToolInvoker │ ◄──────────────────── │ current-thread tokio │
//! └────────────────┘        Result         │ McpSession ─ child   │
//!                                          └──────────────────────┘
//! ```
//!
//! None of these methods may be called from inside an async runtime; they
//! block the calling thread.

use std::thread::{self, JoinHandle};

use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};

use crate::error::{McpError, Result};
use crate::protocol::{CallToolResult, ServerInfo, ToolInfo};
use crate::session::{McpSession, ServerParameters};

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    ListTools {
        reply: Reply<Vec<ToolInfo>>,
    },
    CallTool {
        name: String,
        arguments: Option<Value>,
        reply: Reply<CallToolResult>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

struct Worker {
    commands: mpsc::UnboundedSender<Command>,
    thread: JoinHandle<()>,
    server_info: ServerInfo,
    process_id: Option<u32>,
}

/// What the worker reports once the handshake is done.
type Ready = Result<(ServerInfo, Option<u32>)>;

/// A blocking MCP client backed by a worker thread.
///
/// Construct with [`SyncMcpClient::new`] and call [`open`](Self::open), or use
/// [`SyncMcpClient::connect`] to do both. Dropping the client closes it.
pub struct SyncMcpClient {
    params: ServerParameters,
    worker: Option<Worker>,
}

impl SyncMcpClient {
    /// Create a closed client.
    pub fn new(params: ServerParameters) -> Self {
        Self {
            params,
            worker: None,
        }
    }

    /// Create a client and open it.
    pub fn connect(params: ServerParameters) -> Result<Self> {
        let mut client = Self::new(params);
        client.open()?;
        Ok(client)
    }

    /// Server name from the launch parameters.
    pub fn name(&self) -> &str {
        &self.params.name
    }

    /// Whether a live session exists.
    pub fn is_open(&self) -> bool {
        self.worker.is_some()
    }

    /// Server info from the handshake, if open.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.worker.as_ref().map(|w| &w.server_info)
    }

    /// OS process id of the running server, if open.
    pub fn process_id(&self) -> Option<u32> {
        self.worker.as_ref().and_then(|w| w.process_id)
    }

    /// Spawn the worker, start the server process and complete the handshake.
    ///
    /// Does nothing if the client is already open.
    pub fn open(&mut self) -> Result<&ServerInfo> {
        if self.worker.is_none() {
            let worker = spawn_worker(self.params.clone())?;
            tracing::debug!(
                server = %self.params.name,
                pid = ?worker.process_id,
                "MCP client opened"
            );
            self.worker = Some(worker);
        }

        self.server_info().ok_or(McpError::NotConnected)
    }

    /// Shut down the session, reap the server process and join the worker.
    ///
    /// Calling `close` on a closed client is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let shutdown = if worker
            .commands
            .send(Command::Shutdown { reply: reply_tx })
            .is_ok()
        {
            reply_rx.blocking_recv().unwrap_or(Ok(()))
        } else {
            Ok(())
        };

        let joined = worker
            .thread
            .join()
            .map_err(|_| McpError::transport("MCP worker thread panicked"));

        if let Err(e) = &shutdown {
            tracing::warn!(server = %self.params.name, error = %e, "MCP session teardown failed");
        }
        tracing::debug!(server = %self.params.name, "MCP client closed");

        shutdown.and(joined)
    }

    fn commands(&self) -> Result<&mpsc::UnboundedSender<Command>> {
        self.worker
            .as_ref()
            .map(|w| &w.commands)
            .ok_or(McpError::NotConnected)
    }

    /// List the tools the server exposes, in server order.
    pub fn list_tools(&self) -> Result<Vec<ToolInfo>> {
        request(self.commands()?, |reply| Command::ListTools { reply })
    }

    /// Call a tool and return the full protocol result.
    pub fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
        let name = name.to_string();
        request(self.commands()?, |reply| Command::CallTool {
            name,
            arguments,
            reply,
        })
    }

    /// Create a handle that calls the named tool through this client's session.
    ///
    /// The name is not checked against the server's tool list.
    pub fn invoker(&self, name: &str) -> Result<McpToolInvoker> {
        Ok(McpToolInvoker {
            tool: name.to_string(),
            server: self.params.name.clone(),
            commands: self.commands()?.clone(),
        })
    }
}

impl Drop for SyncMcpClient {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(server = %self.params.name, error = %e, "error closing MCP client on drop");
        }
    }
}

impl std::fmt::Debug for SyncMcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncMcpClient")
            .field("name", &self.params.name)
            .field("open", &self.is_open())
            .field("pid", &self.process_id())
            .finish()
    }
}

/// Open a client, run `f` with it, and close it whatever `f` returns.
pub fn with_client<T, E, F>(params: ServerParameters, f: F) -> std::result::Result<T, E>
where
    F: FnOnce(&SyncMcpClient) -> std::result::Result<T, E>,
    E: From<McpError>,
{
    let mut client = SyncMcpClient::connect(params)?;
    let outcome = f(&client);
    let closed = client.close();

    match outcome {
        Ok(value) => {
            closed?;
            Ok(value)
        }
        Err(e) => {
            if let Err(close_err) = closed {
                tracing::warn!(error = %close_err, "MCP client close failed after error");
            }
            Err(e)
        }
    }
}

/// Calls one tool on a client's session.
///
/// Cheap to clone. Once the owning client is closed every call fails with
/// [`McpError::NotConnected`].
#[derive(Clone)]
pub struct McpToolInvoker {
    tool: String,
    server: String,
    commands: mpsc::UnboundedSender<Command>,
}

impl McpToolInvoker {
    /// Tool name.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Name of the server the tool lives on.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Call the tool and return its first text content element.
    pub fn invoke(&self, arguments: &Map<String, Value>) -> Result<String> {
        let arguments = Some(Value::Object(arguments.clone()));
        let result = request(&self.commands, |reply| Command::CallTool {
            name: self.tool.clone(),
            arguments,
            reply,
        })
        .map_err(|e| match e {
            McpError::ServerError { message, .. } => {
                McpError::tool_execution(&self.tool, message)
            }
            other => other,
        })?;

        if result.is_error() {
            let message = result
                .text()
                .unwrap_or_else(|| "tool reported an error".to_string());
            return Err(McpError::tool_execution(&self.tool, message));
        }

        result
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| McpError::tool_execution(&self.tool, "result has no text content"))
    }
}

impl std::fmt::Debug for McpToolInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpToolInvoker")
            .field("tool", &self.tool)
            .field("server", &self.server)
            .finish()
    }
}

/// Send a command and block until the worker answers.
fn request<T>(
    commands: &mpsc::UnboundedSender<Command>,
    make: impl FnOnce(Reply<T>) -> Command,
) -> Result<T> {
    let (reply_tx, reply_rx) = oneshot::channel();
    commands
        .send(make(reply_tx))
        .map_err(|_| McpError::NotConnected)?;
    reply_rx.blocking_recv().map_err(|_| McpError::NotConnected)?
}

fn spawn_worker(params: ServerParameters) -> Result<Worker> {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel();
    let name = params.name.clone();

    let thread = thread::Builder::new()
        .name(format!("mcp-session-{}", name))
        .spawn(move || run_worker(params, ready_tx, commands_rx))
        .map_err(|e| McpError::spawn_failed(format!("failed to start worker thread: {}", e)))?;

    match ready_rx.blocking_recv() {
        Ok(Ok((server_info, process_id))) => Ok(Worker {
            commands: commands_tx,
            thread,
            server_info,
            process_id,
        }),
        Ok(Err(e)) => {
            let _ = thread.join();
            tracing::error!(server = %name, error = %e, "failed to open MCP session");
            Err(e)
        }
        Err(_) => {
            let _ = thread.join();
            Err(McpError::handshake("worker exited before the handshake finished"))
        }
    }
}

fn run_worker(
    params: ServerParameters,
    ready: oneshot::Sender<Ready>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            let _ = ready.send(Err(McpError::spawn_failed(format!(
                "failed to build worker runtime: {}",
                e
            ))));
            return;
        }
    };

    runtime.block_on(async move {
        let mut session = match McpSession::start(&params).await {
            Ok(session) => session,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        let handshake = (session.server_info().clone(), session.process_id());
        if ready.send(Ok(handshake)).is_err() {
            // Caller gave up waiting
            let _ = session.shutdown().await;
            return;
        }

        let mut shutdown_reply = None;
        while let Some(command) = commands.recv().await {
            match command {
                Command::ListTools { reply } => {
                    let _ = reply.send(session.list_tools().await);
                }
                Command::CallTool {
                    name,
                    arguments,
                    reply,
                } => {
                    let _ = reply.send(session.call_tool(&name, arguments).await);
                }
                Command::Shutdown { reply } => {
                    shutdown_reply = Some(reply);
                    break;
                }
            }
        }

        // Queued commands see their reply channel dropped, i.e. NotConnected
        commands.close();
        let result = session.shutdown().await;
        match shutdown_reply {
            Some(reply) => {
                let _ = reply.send(result);
            }
            None => {
                if let Err(e) = result {
                    tracing::warn!(server = %params.name, error = %e, "MCP session teardown failed");
                }
            }
        }
    });
}
