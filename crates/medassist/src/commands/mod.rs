//! CLI command handlers.

use std::path::Path;

use anyhow::Result;
use medassist_agent::AgentError;
use medassist_config::{AppConfig, ConfigError};
use medassist_llm::LlmError;
use medassist_mcp::McpError;

pub mod ask;
pub mod tools;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration.
    pub config: AppConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load config from `path`, or discover it when no path is given.
    pub fn load(path: Option<&Path>, json_output: bool, verbose: bool) -> Result<Self> {
        let config = match path {
            Some(path) => medassist_config::load_config_file(path)?,
            None => {
                let loaded = medassist_config::load_config(None)?;
                for source in loaded.loaded_from() {
                    tracing::debug!(path = %source.display(), "using config file");
                }
                loaded.config
            }
        };

        Ok(Self {
            config,
            json_output,
            verbose,
        })
    }
}

/// Stable tag for the error behind a failed command.
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<AgentError>() {
        return e.kind();
    }
    if let Some(e) = err.downcast_ref::<McpError>() {
        return match e {
            McpError::NotConnected => "not_connected",
            e if e.is_connection_error() => "connection",
            _ => "mcp",
        };
    }
    if err.downcast_ref::<LlmError>().is_some() {
        return "llm";
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return "config";
    }
    "internal"
}
