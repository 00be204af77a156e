//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [llm]            # completion endpoint and first-request sampling
//! [tool_server]    # how to launch the MCP tool server
//! ```
//!
//! Credentials never live in these files; see [`crate::secrets`].

use medassist_mcp::{Framing, ServerParameters};
use serde::{Deserialize, Serialize};

use crate::secrets::EkaCredentials;

/// Completion endpoint used unless `[llm].base_url` is set.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model used unless `[llm].model` is set.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Token cap for the first request of each query.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Eka API host passed to the tool server.
pub const DEFAULT_API_HOST: &str = "https://api.eka.care";

/// Name used for the tool server in logs and thread names.
pub const TOOL_SERVER_NAME: &str = "eka";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. a project-local
/// override) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Completion endpoint settings.
    pub llm: Option<LlmConfig>,

    /// Tool server launch settings.
    pub tool_server: Option<ToolServerConfig>,
}

impl AppConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not merged field by field.
    pub fn merge(&mut self, other: AppConfig) {
        if other.llm.is_some() {
            self.llm = other.llm;
        }

        if other.tool_server.is_some() {
            self.tool_server = other.tool_server;
        }
    }

    /// The `[llm]` section, or defaults.
    pub fn llm(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }

    /// The `[tool_server]` section, or defaults.
    pub fn tool_server(&self) -> ToolServerConfig {
        self.tool_server.clone().unwrap_or_default()
    }

    /// Launch parameters for the tool server.
    pub fn server_parameters(&self, credentials: &EkaCredentials) -> ServerParameters {
        self.tool_server().server_parameters(credentials)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LLM
// ─────────────────────────────────────────────────────────────────────────────

/// `[llm]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model id.
    pub model: Option<String>,

    /// OpenAI-compatible API base URL.
    pub base_url: Option<String>,

    /// Token cap for the first request of each query.
    pub max_tokens: Option<u32>,

    /// Temperature for the first request of each query.
    pub temperature: Option<f32>,

    /// Retries on network and rate-limit errors.
    pub retries: Option<u32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl LlmConfig {
    /// Configured model or [`DEFAULT_MODEL`].
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Configured base URL or [`DEFAULT_BASE_URL`].
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Configured token cap or [`DEFAULT_MAX_TOKENS`].
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Configured temperature or `0.0`.
    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool server
// ─────────────────────────────────────────────────────────────────────────────

/// `[tool_server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolServerConfig {
    /// Command to spawn.
    pub command: String,

    /// Arguments placed before the credential flags.
    pub args: Vec<String>,

    /// Eka API host; `EKA_API_HOST` takes priority.
    pub api_host: Option<String>,

    /// Tool names never offered to the model.
    pub excluded_tools: Vec<String>,

    /// Wire framing the server speaks.
    pub framing: Framing,
}

impl Default for ToolServerConfig {
    fn default() -> Self {
        Self {
            command: "uvx".to_string(),
            args: vec!["eka_mcp_server".to_string()],
            api_host: None,
            excluded_tools: vec!["list_tables".to_string()],
            framing: Framing::default(),
        }
    }
}

impl ToolServerConfig {
    /// Launch parameters with the credential flags appended.
    pub fn server_parameters(&self, credentials: &EkaCredentials) -> ServerParameters {
        let api_host = credentials
            .api_host
            .as_deref()
            .or(self.api_host.as_deref())
            .unwrap_or(DEFAULT_API_HOST);

        ServerParameters::new(TOOL_SERVER_NAME, &self.command)
            .with_args(self.args.clone())
            .with_arg("--eka-api-host")
            .with_arg(api_host)
            .with_arg("--client-id")
            .with_arg(&credentials.client_id)
            .with_arg("--client-secret")
            .with_arg(&credentials.client_secret)
            .with_framing(self.framing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(api_host: Option<&str>) -> EkaCredentials {
        EkaCredentials {
            client_id: "client-123".to_string(),
            client_secret: "s3cret".to_string(),
            api_host: api_host.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_config_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::new());

        let llm = config.llm();
        assert_eq!(llm.model(), DEFAULT_MODEL);
        assert_eq!(llm.base_url(), DEFAULT_BASE_URL);
        assert_eq!(llm.max_tokens(), 4096);
        assert_eq!(llm.temperature(), 0.0);
        assert_eq!(llm.retries, None);

        let server = config.tool_server();
        assert_eq!(server.command, "uvx");
        assert_eq!(server.excluded_tools, vec!["list_tables"]);
        assert_eq!(server.framing, Framing::NewlineDelimited);
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml(
            r#"
[llm]
model = "llama-3.1-8b-instant"
base_url = "http://localhost:8080/v1"
max_tokens = 1024
temperature = 0.3
retries = 1
timeout_secs = 30

[tool_server]
command = "python"
args = ["-m", "eka_mcp_server"]
api_host = "https://staging.eka.care"
excluded_tools = []
framing = "content_length"
"#,
        )
        .unwrap();

        let llm = config.llm();
        assert_eq!(llm.model(), "llama-3.1-8b-instant");
        assert_eq!(llm.base_url(), "http://localhost:8080/v1");
        assert_eq!(llm.max_tokens(), 1024);
        assert_eq!(llm.temperature(), 0.3);
        assert_eq!(llm.retries, Some(1));
        assert_eq!(llm.timeout_secs, Some(30));

        let server = config.tool_server();
        assert_eq!(server.command, "python");
        assert_eq!(server.args, vec!["-m", "eka_mcp_server"]);
        assert!(server.excluded_tools.is_empty());
        assert_eq!(server.framing, Framing::ContentLength);
    }

    #[test]
    fn test_partial_tool_server_section_keeps_defaults() {
        let config = AppConfig::from_toml("[tool_server]\nframing = \"content_length\"\n").unwrap();
        let server = config.tool_server();
        assert_eq!(server.command, "uvx");
        assert_eq!(server.args, vec!["eka_mcp_server"]);
        assert_eq!(server.framing, Framing::ContentLength);
    }

    #[test]
    fn test_invalid_framing_rejected() {
        let err = AppConfig::from_toml("[tool_server]\nframing = \"xml\"\n").unwrap_err();
        assert!(matches!(err, crate::ConfigError::Parse(_)));
    }

    #[test]
    fn test_merge_replaces_sections() {
        let mut base = AppConfig::from_toml(
            r#"
[llm]
model = "base-model"
retries = 5

[tool_server]
command = "uvx"
"#,
        )
        .unwrap();
        let project = AppConfig::from_toml("[llm]\nmodel = \"project-model\"\n").unwrap();
        base.merge(project);

        assert_eq!(base.llm().model(), "project-model");
        assert_eq!(base.llm().retries, None);
        assert!(base.tool_server.is_some());
    }

    #[test]
    fn test_server_parameters_default() {
        let params = AppConfig::new().server_parameters(&credentials(None));
        assert_eq!(params.name, "eka");
        assert_eq!(params.command, "uvx");
        assert_eq!(
            params.args,
            vec![
                "eka_mcp_server",
                "--eka-api-host",
                "https://api.eka.care",
                "--client-id",
                "client-123",
                "--client-secret",
                "s3cret",
            ]
        );
        assert_eq!(params.framing, Framing::NewlineDelimited);
    }

    #[test]
    fn test_server_parameters_api_host_priority() {
        let config = AppConfig::from_toml("[tool_server]\napi_host = \"https://file.example\"\n")
            .unwrap();

        let params = config.server_parameters(&credentials(None));
        assert_eq!(params.args[2], "https://file.example");

        let params = config.server_parameters(&credentials(Some("https://env.example")));
        assert_eq!(params.args[2], "https://env.example");
    }
}
