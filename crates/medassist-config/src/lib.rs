//! Configuration for MedAssist.
//!
//! Provides:
//! - TOML configuration (`[llm]`, `[tool_server]`) with layering of the XDG
//!   user config and a project-local `medassist.toml`
//! - Credentials from environment variables, with `.env` support
//! - Launch parameters for the tool server

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{Credentials, EkaCredentials, load_dotenv};
pub use types::*;
