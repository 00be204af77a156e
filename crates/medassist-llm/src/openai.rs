//! OpenAI-compatible chat completions backend.
//!
//! Talks to OpenAI's API or any compatible service. Groq is the default.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use std::time::Duration;

use crate::backend::{LlmBackend, with_retry};
use crate::error::{LlmError, RateLimitInfo, Result};
use crate::types::{ChatCompletionRequest, ChatCompletionResponse};

/// Groq's OpenAI-compatible API base URL.
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default OpenAI API base URL.
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";

/// Model used against Groq unless configured otherwise.
pub const DEFAULT_GROQ_MODEL: &str = "llama3-8b-8192";

/// Default timeout for requests.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token.
    pub api_key: Option<String>,

    /// Base URL for the API.
    pub base_url: String,

    /// Model used when a request leaves `model` empty.
    pub model: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries for transient errors.
    pub max_retries: u32,

    /// Initial backoff duration for retries.
    pub retry_backoff: Duration,

    /// Name for this backend instance.
    pub name: String,
}

impl OpenAiConfig {
    /// Config for Groq.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: GROQ_API_BASE.to_string(),
            model: DEFAULT_GROQ_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            name: "groq".to_string(),
        }
    }

    /// Config for OpenAI.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE.to_string(),
            model: model.into(),
            name: "openai".to_string(),
            ..Self::groq(api_key)
        }
    }

    /// Groq config with the key from `GROQ_API_KEY`.
    pub fn groq_from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            LlmError::Config("GROQ_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::groq(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the backend name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI Backend
// ─────────────────────────────────────────────────────────────────────────────

/// OpenAI-compatible API backend.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a Groq backend from the environment.
    pub fn groq_from_env() -> Result<Self> {
        Self::new(OpenAiConfig::groq_from_env()?)
    }

    /// Backend configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(header::CONTENT_TYPE, "application/json");

        if let Some(ref api_key) = self.config.api_key {
            builder.header(header::AUTHORIZATION, format!("Bearer {}", api_key))
        } else {
            builder
        }
    }

    async fn handle_response(response: Response) -> Result<ChatCompletionResponse> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;

        if parsed.choices.is_empty() {
            return Err(LlmError::InvalidResponse(
                "response contained no choices".to_string(),
            ));
        }

        Ok(parsed)
    }

    async fn handle_error_response(response: Response) -> LlmError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<OpenAiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

        match status.as_u16() {
            401 | 403 => LlmError::Auth(message),
            429 => LlmError::RateLimit(RateLimitInfo::parse_groq(
                &message,
                retry_after.as_deref(),
            )),
            400 | 404 | 422 => LlmError::InvalidRequest(message),
            500..=599 => LlmError::Backend(format!("Server error: {}", message)),
            _ => LlmError::Backend(message),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let mut request = request;
        if request.model.is_empty() {
            request.model = self.config.model.clone();
        }

        tracing::debug!(
            backend = %self.config.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            "Sending chat completion request"
        );

        let response = with_retry(
            self.config.max_retries,
            self.config.retry_backoff,
            &self.config.name,
            || async {
                let response = self
                    .add_headers(self.client.post(self.completions_url()))
                    .json(&request)
                    .send()
                    .await?;

                Self::handle_response(response).await
            },
        )
        .await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                backend = %self.config.name,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion finished"
            );
        }

        Ok(response)
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn default_model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, serde::Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiError,
}

#[derive(Debug, serde::Deserialize)]
struct OpenAiError {
    message: String,
}
