//! Tool descriptors and the name-keyed registry.
//!
//! A [`ToolDescriptor`] pairs a tool's function-call schema with an invoker
//! that runs it. The orchestrator only ever sees descriptors through a
//! [`ToolRegistry`].
//!
//! # Example
//!
//! ```rust,ignore
//! use medassist_agent::{ToolDescriptor, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(ToolDescriptor::new(invoker, schema));
//!
//! let text = registry.invoke("lookup_price", &args)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use medassist_llm::ToolDefinition;
use medassist_mcp::McpToolInvoker;
use serde_json::{Map, Value};

use crate::error::{AgentError, Result};

/// Function-call schema offered to the model.
pub type ToolSchema = ToolDefinition;

/// Something that can run a tool given named arguments.
pub trait ToolInvoke: Send + Sync {
    /// Run the tool and return its text result.
    fn invoke(&self, arguments: &Map<String, Value>) -> medassist_mcp::Result<String>;
}

impl ToolInvoke for McpToolInvoker {
    fn invoke(&self, arguments: &Map<String, Value>) -> medassist_mcp::Result<String> {
        McpToolInvoker::invoke(self, arguments)
    }
}

/// A named, invocable tool with its schema.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    invoker: Arc<dyn ToolInvoke>,
    schema: ToolSchema,
}

impl ToolDescriptor {
    /// Create a descriptor; the name is taken from the schema.
    pub fn new(invoker: Arc<dyn ToolInvoke>, schema: ToolSchema) -> Self {
        Self {
            name: schema.name().to_string(),
            invoker,
            schema,
        }
    }

    /// Tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool description, or `""`.
    pub fn description(&self) -> &str {
        self.schema.function.description.as_deref().unwrap_or("")
    }

    /// Function-call schema.
    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    /// Run the tool.
    pub fn invoke(&self, arguments: &Map<String, Value>) -> Result<String> {
        self.invoker
            .invoke(arguments)
            .map_err(|e| AgentError::tool_execution(&self.name, e))
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Tools keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn register(&mut self, descriptor: ToolDescriptor) {
        let name = descriptor.name().to_string();
        if self.tools.insert(name.clone(), descriptor).is_some() {
            tracing::warn!(tool = %name, "duplicate tool name, replacing earlier entry");
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Descriptors sorted by name.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        let mut descriptors: Vec<&ToolDescriptor> = self.tools.values().collect();
        descriptors.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        descriptors
    }

    /// Schemas for every tool, sorted by name.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.descriptors()
            .into_iter()
            .map(|d| d.schema().clone())
            .collect()
    }

    /// Run a tool by name.
    pub fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> Result<String> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        descriptor.invoke(arguments)
    }
}
