//! Tool-calling orchestrator.
//!
//! [`Orchestrator`] answers one query per call: it sends the query with the
//! tab's system prompt and the registry's tool schemas, runs any tools the
//! model asks for, and sends a single follow-up with the tool results.
//!
//! ```text
//! generate_response(query, tab)
//!        │
//!        ▼
//!   first request (tools, temperature 0, max_tokens 4096)
//!        │
//!        ├── no tool calls ─────────────────────► done
//!        │
//!        ▼
//!   run each call in order, append tool messages
//!        │
//!        ▼
//!   follow-up request (no tools, default sampling) ► done
//! ```

use medassist_llm::{
    ChatCompletionRequest, ChatCompletionResponse, Message, SharedBackend, ToolCall,
};
use medassist_mcp::SyncMcpClient;
use serde::Serialize;

use crate::error::{AgentError, Result};
use crate::prompt::{Tab, system_prompt};
use crate::registry::{RegistryBuilder, ToolProvider};
use crate::tool::ToolRegistry;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Sampling settings for the first request of each query.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Model id; empty uses the backend's default model.
    pub model: String,
    /// Token cap for the first request.
    pub max_tokens: u32,
    /// Temperature for the first request.
    pub temperature: f32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 4096,
            temperature: 0.0,
        }
    }
}

impl OrchestratorConfig {
    /// Set the model id.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the first request's token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the first request's temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result
// ─────────────────────────────────────────────────────────────────────────────

/// Answer to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionResult {
    /// Text of the final message, or `""`.
    pub content: String,
    /// The last completion response as received.
    pub raw: ChatCompletionResponse,
}

impl CompletionResult {
    fn from_response(raw: ChatCompletionResponse) -> Self {
        let content = raw
            .first_message()
            .map(|m| m.content_text().to_string())
            .unwrap_or_default();
        Self { content, raw }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ─────────────────────────────────────────────────────────────────────────────

/// Sequential query answering over a completion backend and a tool provider.
///
/// Calls block the current thread. Do not call from inside an async runtime.
pub struct Orchestrator<P: ToolProvider = SyncMcpClient> {
    backend: SharedBackend,
    provider: P,
    builder: RegistryBuilder,
    registry: ToolRegistry,
    config: OrchestratorConfig,
    runtime: tokio::runtime::Runtime,
}

impl<P: ToolProvider> Orchestrator<P> {
    /// Create an orchestrator; the registry is built on first use.
    pub fn new(backend: SharedBackend, provider: P, config: OrchestratorConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AgentError::internal(format!("failed to build runtime: {}", e)))?;

        Ok(Self {
            backend,
            provider,
            builder: RegistryBuilder::default(),
            registry: ToolRegistry::new(),
            config,
            runtime,
        })
    }

    /// Use a custom registry builder.
    pub fn with_registry_builder(mut self, builder: RegistryBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Orchestrator configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// The tool provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Consume the orchestrator and return its provider.
    pub fn into_provider(self) -> P {
        self.provider
    }

    /// The tool registry, built now if it is empty.
    pub fn tools(&mut self) -> &ToolRegistry {
        if self.registry.is_empty() {
            self.registry = self.builder.build(&mut self.provider);
        }
        &self.registry
    }

    /// Restart the tool provider and build the registry again.
    pub fn reload_tools(&mut self) -> &ToolRegistry {
        self.registry = ToolRegistry::new();
        if let Err(e) = self.provider.close() {
            tracing::warn!(error = %e, "error closing tool server before reload");
        }
        self.tools()
    }

    fn model(&self) -> String {
        if self.config.model.is_empty() {
            self.backend.default_model().to_string()
        } else {
            self.config.model.clone()
        }
    }

    fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let backend = self.backend.clone();
        Ok(self.runtime.block_on(backend.complete(request))?)
    }

    /// Answer `query` in the context of `tab`.
    pub fn generate_response(&mut self, query: &str, tab: Tab) -> Result<CompletionResult> {
        self.tools();

        let model = self.model();
        let mut messages = vec![
            Message::system(system_prompt(tab, &self.registry)),
            Message::user(query),
        ];

        tracing::debug!(%tab, tools = self.registry.len(), "sending query");
        let request = ChatCompletionRequest::new(model.clone(), messages.clone())
            .with_tools(self.registry.schemas())
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);
        let response = self.complete(request)?;

        let (content, calls) = match response.first_message() {
            Some(first) if !first.tool_calls().is_empty() => {
                (first.content.clone(), first.tool_calls().to_vec())
            }
            _ => return Ok(CompletionResult::from_response(response)),
        };

        messages.push(Message::assistant_tool_calls(content, calls.clone()));

        for call in &calls {
            let output = self.run_tool_call(call)?;
            messages.push(Message::tool(
                call.id.clone(),
                call.name(),
                serde_json::to_string(&output)?,
            ));
        }

        tracing::debug!(tool_calls = calls.len(), "sending follow-up with tool results");
        let response = self.complete(ChatCompletionRequest::new(model, messages))?;
        Ok(CompletionResult::from_response(response))
    }

    fn run_tool_call(&self, call: &ToolCall) -> Result<String> {
        let name = call.name();
        let arguments = call
            .function
            .arguments
            .parse()
            .map_err(|e| AgentError::InvalidArguments {
                tool: name.to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(tool = %name, call_id = %call.id, "invoking tool");
        let output = self.registry.invoke(name, &arguments)?;
        tracing::debug!(tool = %name, bytes = output.len(), "tool finished");
        Ok(output)
    }
}

impl<P: ToolProvider> std::fmt::Debug for Orchestrator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .field("tools", &self.registry.names())
            .finish()
    }
}
