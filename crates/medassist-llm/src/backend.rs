//! Completion backend trait, retry helper and mock implementation.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{LlmError, Result};
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, Message};

// ─────────────────────────────────────────────────────────────────────────────
// Shared Retry Logic
// ─────────────────────────────────────────────────────────────────────────────

/// Execute an async operation with exponential backoff retry.
///
/// Only retryable errors (network, rate limit) are retried. A rate limit that
/// names its own delay waits that long instead of the current backoff.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = initial_backoff;
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() || attempt >= max_retries => return Err(e),
            Err(e) => {
                let wait = e.retry_after().unwrap_or(backoff);
                attempt += 1;
                tracing::warn!(
                    backend = backend_name,
                    attempt,
                    max_retries,
                    wait_ms = wait.as_millis() as u64,
                    error = %e,
                    "Request failed, retrying"
                );
                tokio::time::sleep(wait).await;
                backoff *= 2;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A chat completion endpoint.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Execute a completion request and return the full response.
    async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse>;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Model used when the caller does not pick one.
    fn default_model(&self) -> &str;
}

/// Shared, dynamically dispatched backend.
pub type SharedBackend = Arc<dyn LlmBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A mock backend for testing.
///
/// Returns queued responses in order and records every request. Once the
/// queue is empty, further requests fail with a backend error.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    model: String,
    responses: Mutex<Vec<Result<ChatCompletionResponse>>>,
    request_log: Mutex<Vec<ChatCompletionRequest>>,
}

impl MockBackend {
    /// Create a mock backend with the given responses.
    pub fn new(responses: Vec<ChatCompletionResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock backend whose replies may include errors.
    pub fn with_results(results: Vec<Result<ChatCompletionResponse>>) -> Self {
        Self {
            name: "mock".to_string(),
            model: "mock-model".to_string(),
            responses: Mutex::new(results),
            request_log: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![ChatCompletionResponse::from_message(
            "mock-model",
            Message::assistant(text),
        )])
    }

    /// All requests made so far.
    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.request_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests made so far.
    pub fn request_count(&self) -> usize {
        self.request_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        self.request_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        if responses.is_empty() {
            return Err(LlmError::Backend(
                "MockBackend: no more responses available".to_string(),
            ));
        }
        responses.remove(0)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
