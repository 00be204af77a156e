//! Chat completion client for MedAssist.
//!
//! The core abstraction is the [`LlmBackend`] trait. [`OpenAiBackend`] speaks
//! the OpenAI `/chat/completions` protocol (Groq by default) and
//! [`MockBackend`] replays canned responses in tests.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  LlmBackend trait                       │
//! │  - complete() -> ChatCompletionResponse │
//! └─────────────────────────────────────────┘
//!                    │
//!          ┌─────────┴─────────┐
//!          ▼                   ▼
//!   ┌──────────────┐    ┌─────────────┐
//!   │ OpenAiBackend│    │ MockBackend │
//!   │ (Groq)       │    │             │
//!   └──────────────┘    └─────────────┘
//! ```

pub mod backend;
pub mod error;
pub mod openai;
pub mod types;

pub use backend::{LlmBackend, MockBackend, SharedBackend, with_retry};
pub use error::{LlmError, RateLimitInfo, RateLimitType, Result};
pub use openai::{DEFAULT_GROQ_MODEL, GROQ_API_BASE, OpenAiBackend, OpenAiConfig};
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, Choice, FunctionCall, FunctionDefinition,
    Message, Role, ToolArguments, ToolCall, ToolDefinition, Usage,
};
