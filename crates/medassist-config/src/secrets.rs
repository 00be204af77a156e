//! Credentials from the environment.
//!
//! Credentials are read from environment variables only, after an optional
//! `.env` file has been loaded with [`load_dotenv`]. Empty values count as
//! missing.

use std::path::PathBuf;

use crate::{ConfigError, Result};

/// Completion endpoint API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Tool server client id.
pub const EKA_CLIENT_ID_ENV: &str = "EKA_CLIENT_ID";

/// Tool server client secret.
pub const EKA_CLIENT_SECRET_ENV: &str = "EKA_CLIENT_SECRET";

/// Optional tool server API host.
pub const EKA_API_HOST_ENV: &str = "EKA_API_HOST";

/// Load `.env` from the current directory or its parents.
///
/// Existing environment variables are not overridden. Returns the file that
/// was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load .env");
            None
        }
    }
}

/// Credentials for the tool server.
#[derive(Clone, PartialEq, Eq)]
pub struct EkaCredentials {
    pub client_id: String,
    pub client_secret: String,
    /// Overrides `[tool_server].api_host` when set.
    pub api_host: Option<String>,
}

impl EkaCredentials {
    /// Read from `EKA_CLIENT_ID`, `EKA_CLIENT_SECRET` and `EKA_API_HOST`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: require(EKA_CLIENT_ID_ENV)?,
            client_secret: require(EKA_CLIENT_SECRET_ENV)?,
            api_host: optional(EKA_API_HOST_ENV),
        })
    }
}

impl std::fmt::Debug for EkaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EkaCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_host", &self.api_host)
            .finish()
    }
}

/// Everything needed to answer a query.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub groq_api_key: String,
    pub eka: EkaCredentials,
}

impl Credentials {
    /// Read all credentials, failing on the first missing one.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            groq_api_key: require(GROQ_API_KEY_ENV)?,
            eka: EkaCredentials::from_env()?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("groq_api_key", &"<redacted>")
            .field("eka", &self.eka)
            .finish()
    }
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn require(var: &str) -> Result<String> {
    optional(var).ok_or_else(|| ConfigError::missing_credential(var))
}
