//! Builds a [`ToolRegistry`] from a tool server.

use std::sync::Arc;

use medassist_mcp::{McpError, SyncMcpClient, ToolInfo};
use serde_json::json;

use crate::tool::{ToolDescriptor, ToolInvoke, ToolRegistry, ToolSchema};

/// Tool names never offered to the model.
pub const DEFAULT_EXCLUDED_TOOLS: &[&str] = &["list_tables"];

/// A source of tools, normally an MCP server.
pub trait ToolProvider {
    /// Open the provider if it is not open yet.
    fn ensure_open(&mut self) -> medassist_mcp::Result<()>;

    /// Close the provider; closing a closed provider does nothing.
    fn close(&mut self) -> medassist_mcp::Result<()>;

    /// List tool descriptions in provider order.
    fn list_tools(&self) -> medassist_mcp::Result<Vec<ToolInfo>>;

    /// Create an invoker for the named tool.
    fn invoker(&self, name: &str) -> medassist_mcp::Result<Arc<dyn ToolInvoke>>;
}

impl ToolProvider for SyncMcpClient {
    fn ensure_open(&mut self) -> medassist_mcp::Result<()> {
        self.open().map(|_| ())
    }

    fn close(&mut self) -> medassist_mcp::Result<()> {
        SyncMcpClient::close(self)
    }

    fn list_tools(&self) -> medassist_mcp::Result<Vec<ToolInfo>> {
        SyncMcpClient::list_tools(self)
    }

    fn invoker(&self, name: &str) -> medassist_mcp::Result<Arc<dyn ToolInvoke>> {
        Ok(Arc::new(SyncMcpClient::invoker(self, name)?))
    }
}

/// Turns a provider's tool list into a registry, skipping excluded names.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    excluded: Vec<String>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            excluded: DEFAULT_EXCLUDED_TOOLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl RegistryBuilder {
    /// Builder with the default exclusions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the excluded tool names.
    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = names.into_iter().map(Into::into).collect();
        self
    }

    /// Names this builder skips.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Whether `name` is skipped.
    pub fn excludes(&self, name: &str) -> bool {
        self.excluded.iter().any(|e| e == name)
    }

    /// Build a registry from the provider, opening it first if needed.
    ///
    /// Never fails: any error is logged and yields an empty registry.
    pub fn build<P: ToolProvider + ?Sized>(&self, provider: &mut P) -> ToolRegistry {
        match self.try_build(provider) {
            Ok(registry) => {
                tracing::info!(tool_count = registry.len(), "tool registry built");
                registry
            }
            Err(e) => {
                tracing::error!(error = %e, "error setting up tools, continuing without tools");
                ToolRegistry::new()
            }
        }
    }

    /// Build a registry, returning the first error instead of degrading.
    ///
    /// A provider whose listing fails is restarted once before giving up, so
    /// a server that died since it was opened is replaced by a fresh one.
    pub fn try_build<P: ToolProvider + ?Sized>(
        &self,
        provider: &mut P,
    ) -> Result<ToolRegistry, McpError> {
        provider.ensure_open()?;

        let tools = match provider.list_tools() {
            Ok(tools) => tools,
            Err(e) => {
                tracing::warn!(error = %e, "listing tools failed, restarting tool server");
                restart(provider)?;
                provider.list_tools()?
            }
        };

        let mut registry = ToolRegistry::new();
        for info in tools {
            if self.excludes(&info.name) {
                tracing::debug!(tool = %info.name, "skipping excluded tool");
                continue;
            }

            let invoker = provider.invoker(&info.name)?;
            registry.register(ToolDescriptor::new(invoker, schema_for(&info)));
        }

        Ok(registry)
    }
}

/// Close and reopen a provider. A failed close is logged and ignored.
fn restart<P: ToolProvider + ?Sized>(provider: &mut P) -> Result<(), McpError> {
    if let Err(e) = provider.close() {
        tracing::warn!(error = %e, "error closing tool server");
    }
    provider.ensure_open()
}

/// Function-call schema for a listed tool; a missing input schema becomes `{}`.
pub fn schema_for(info: &ToolInfo) -> ToolSchema {
    ToolSchema::function(
        info.name.clone(),
        info.description.clone(),
        info.input_schema.clone().unwrap_or_else(|| json!({})),
    )
}
