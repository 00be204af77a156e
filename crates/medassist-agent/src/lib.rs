//! Tool-calling orchestration for MedAssist.
//!
//! This crate turns a tool server's tool list into a registry the model can
//! call into, and runs the two-step query loop against a completion backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                               │
//! │  - Builds the system prompt for the query's tab             │
//! │  - Dispatches tool calls in order                           │
//! │  - Sends one follow-up with the tool results                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!       ┌────────────┐  ┌──────────────┐  ┌──────────────┐
//!       │ LlmBackend │  │ ToolRegistry │  │ ToolProvider │
//!       │(medassist- │  │              │  │(SyncMcp-     │
//!       │ llm)       │  │              │  │ Client)      │
//!       └────────────┘  └──────────────┘  └──────────────┘
//! ```
//!
//! # Core Components
//!
//! - [`Orchestrator`]: answers one query per [`Orchestrator::generate_response`] call
//! - [`RegistryBuilder`]: lists a provider's tools into a [`ToolRegistry`]
//! - [`ToolDescriptor`]: a tool's schema plus the invoker that runs it
//! - [`Tab`]: the query context that selects the system prompt

pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod registry;
pub mod tool;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AgentError, Result};
pub use orchestrator::{CompletionResult, Orchestrator, OrchestratorConfig};
pub use prompt::{Tab, system_prompt};
pub use registry::{DEFAULT_EXCLUDED_TOOLS, RegistryBuilder, ToolProvider};
pub use tool::{ToolDescriptor, ToolInvoke, ToolRegistry, ToolSchema};
