//! Error types for the completion backend.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using the LLM error type.
pub type Result<T> = std::result::Result<T, LlmError>;

// ─────────────────────────────────────────────────────────────────────────────
// Rate Limit Info
// ─────────────────────────────────────────────────────────────────────────────

/// Details of a rate-limit rejection.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// The error message from the provider.
    pub message: String,
    /// How long to wait before retrying, when the provider says.
    pub retry_after: Option<Duration>,
    /// Which limit was hit, when recognisable.
    pub limit_type: Option<RateLimitType>,
}

/// Type of rate limit encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitType {
    /// Tokens per minute limit.
    TokensPerMinute,
    /// Requests per minute limit.
    RequestsPerMinute,
    /// Requests per day limit.
    RequestsPerDay,
}

impl RateLimitInfo {
    /// Rate limit with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retry_after: None,
            limit_type: None,
        }
    }

    /// Rate limit with a retry delay.
    pub fn with_retry_after(message: impl Into<String>, retry_after: Duration) -> Self {
        Self {
            message: message.into(),
            retry_after: Some(retry_after),
            limit_type: None,
        }
    }

    /// Parse a Groq rate-limit message.
    ///
    /// Groq puts the delay in the message body, e.g.
    /// "Rate limit reached ... on tokens per minute (TPM) ... Please try again in 6.57792s."
    /// A `Retry-After` header, when present, wins over the body.
    pub fn parse_groq(message: &str, retry_after_header: Option<&str>) -> Self {
        let retry_after = retry_after_header
            .and_then(parse_retry_after_header)
            .or_else(|| parse_try_again_in(message));

        let limit_type = if message.contains("TPM") || message.contains("tokens per minute") {
            Some(RateLimitType::TokensPerMinute)
        } else if message.contains("RPM") || message.contains("requests per minute") {
            Some(RateLimitType::RequestsPerMinute)
        } else if message.contains("RPD") || message.contains("requests per day") {
            Some(RateLimitType::RequestsPerDay)
        } else {
            None
        };

        Self {
            message: message.to_string(),
            retry_after,
            limit_type,
        }
    }
}

impl std::fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(retry_after) = self.retry_after {
            write!(f, " (retry after {:.2}s)", retry_after.as_secs_f64())?;
        }
        Ok(())
    }
}

/// Extract the delay from "try again in 6.5s" style messages.
fn parse_try_again_in(message: &str) -> Option<Duration> {
    let lower = message.to_ascii_lowercase();
    let idx = lower.find("try again in ")?;
    let rest = &message[idx + "try again in ".len()..];

    let num_str: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let value = num_str.parse::<f64>().ok()?;
    let unit = &rest[num_str.len()..];
    let seconds = if unit.starts_with("ms") {
        value / 1000.0
    } else {
        value
    };
    Some(Duration::from_secs_f64(seconds))
}

/// Parse a `Retry-After` header given in whole seconds.
fn parse_retry_after_header(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

// ─────────────────────────────────────────────────────────────────────────────
// LlmError
// ─────────────────────────────────────────────────────────────────────────────

/// Error type for completion requests.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider answered with an error status.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Network/connectivity error (retryable).
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration error (API key missing, etc.).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The request was rejected as malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded (retryable with backoff).
    #[error("Rate limit exceeded: {0}")]
    RateLimit(RateLimitInfo),

    /// Authentication failed.
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl LlmError {
    /// Create a rate limit error from a message string.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit(RateLimitInfo::new(message))
    }

    /// Get the retry-after duration if this is a rate limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit(info) => info.retry_after,
            _ => None,
        }
    }

    /// Network and rate-limit errors may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimit(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            LlmError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            LlmError::Serialization(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}
