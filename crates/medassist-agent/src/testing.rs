//! Test doubles for tool invocation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use medassist_mcp::{McpError, ToolInfo};
use serde_json::{Map, Value, json};

use crate::registry::ToolProvider;
use crate::tool::ToolInvoke;

type ErrorFactory = Box<dyn Fn() -> McpError + Send + Sync>;

/// Invoker that returns a fixed reply and records its arguments.
pub struct RecordingInvoker {
    reply: Result<String, ErrorFactory>,
    calls: Mutex<Vec<Map<String, Value>>>,
}

impl RecordingInvoker {
    pub fn ok(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn err(make: impl Fn() -> McpError + Send + Sync + 'static) -> Self {
        Self {
            reply: Err(Box::new(make)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Map<String, Value>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ToolInvoke for RecordingInvoker {
    fn invoke(&self, arguments: &Map<String, Value>) -> medassist_mcp::Result<String> {
        self.calls.lock().unwrap().push(arguments.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

type CallLog = Arc<Mutex<Vec<(String, Map<String, Value>)>>>;

/// Invoker handed out by [`StubProvider`]; logs into the provider's shared log.
struct StubInvoker {
    name: String,
    reply: String,
    log: CallLog,
}

impl ToolInvoke for StubInvoker {
    fn invoke(&self, arguments: &Map<String, Value>) -> medassist_mcp::Result<String> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), arguments.clone()));
        Ok(self.reply.clone())
    }
}

/// In-memory tool provider.
pub struct StubProvider {
    tools: Vec<ToolInfo>,
    replies: HashMap<String, String>,
    log: CallLog,
    open: bool,
    dead: bool,
    open_count: usize,
    close_count: usize,
    list_count: Mutex<usize>,
    fail_open: bool,
    fail_list: bool,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            replies: HashMap::new(),
            log: Arc::new(Mutex::new(Vec::new())),
            open: false,
            dead: false,
            open_count: 0,
            close_count: 0,
            list_count: Mutex::new(0),
            fail_open: false,
            fail_list: false,
        }
    }

    /// Three tools shaped like the drug catalogue server's.
    pub fn medication_catalogue() -> Self {
        Self::new()
            .with_tool(
                "lookup_price",
                Some("Look up the retail price of a drug"),
                Some(json!({
                    "type": "object",
                    "properties": {"drug": {"type": "string"}},
                    "required": ["drug"]
                })),
                "Paracetamol 500mg: 25.00 INR",
            )
            .with_tool("list_tables", None, None, "drugs, prices")
            .with_tool(
                "search_generics",
                Some("Find generic equivalents of a branded drug"),
                Some(json!({
                    "type": "object",
                    "properties": {
                        "brand": {"type": "string"},
                        "limit": {"type": "integer"}
                    }
                })),
                "3 generics found",
            )
    }

    pub fn with_tool(
        mut self,
        name: &str,
        description: Option<&str>,
        input_schema: Option<Value>,
        reply: &str,
    ) -> Self {
        self.tools.push(ToolInfo {
            name: name.to_string(),
            description: description.map(str::to_string),
            input_schema,
        });
        self.replies.insert(name.to_string(), reply.to_string());
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn set_failing_list(&mut self, failing: bool) {
        self.fail_list = failing;
    }

    /// Kill the current session; it stays "open" until closed.
    pub fn crash(&mut self) {
        self.dead = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_count(&self) -> usize {
        self.open_count
    }

    pub fn close_count(&self) -> usize {
        self.close_count
    }

    pub fn list_count(&self) -> usize {
        *self.list_count.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.log.lock().unwrap().clone()
    }
}

impl ToolProvider for StubProvider {
    fn ensure_open(&mut self) -> medassist_mcp::Result<()> {
        if self.fail_open {
            return Err(McpError::spawn_failed("stub: no such command"));
        }
        if !self.open {
            self.open = true;
            self.open_count += 1;
        }
        Ok(())
    }

    fn close(&mut self) -> medassist_mcp::Result<()> {
        if self.open {
            self.open = false;
            self.close_count += 1;
        }
        self.dead = false;
        Ok(())
    }

    fn list_tools(&self) -> medassist_mcp::Result<Vec<ToolInfo>> {
        *self.list_count.lock().unwrap() += 1;
        if !self.open {
            return Err(McpError::NotConnected);
        }
        if self.fail_list || self.dead {
            return Err(McpError::ConnectionClosed);
        }
        Ok(self.tools.clone())
    }

    fn invoker(&self, name: &str) -> medassist_mcp::Result<Arc<dyn ToolInvoke>> {
        if !self.open {
            return Err(McpError::NotConnected);
        }
        Ok(Arc::new(StubInvoker {
            name: name.to_string(),
            reply: self.replies.get(name).cloned().unwrap_or_default(),
            log: Arc::clone(&self.log),
        }))
    }
}
