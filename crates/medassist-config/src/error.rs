//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading configuration and credentials.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required credential is not set in the environment.
    #[error("{var} environment variable is not set")]
    MissingCredential { var: String },
}

impl ConfigError {
    /// Create a missing credential error.
    pub fn missing_credential(var: impl Into<String>) -> Self {
        Self::MissingCredential { var: var.into() }
    }
}
