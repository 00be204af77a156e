//! Ask command - one-shot medication question.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::Style;
use medassist_agent::{Orchestrator, OrchestratorConfig, RegistryBuilder, Tab};
use medassist_config::{Credentials, LlmConfig};
use medassist_llm::{OpenAiBackend, OpenAiConfig};
use medassist_mcp::SyncMcpClient;

use super::Context;

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Context tab: alternatives, generic_medicines or medicine_finder
    #[arg(short, long, default_value = "medicine_finder")]
    pub tab: String,
}

/// Run the ask command.
pub fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let credentials = Credentials::from_env()?;
    let llm = ctx.config.llm();
    let server = ctx.config.tool_server();
    let tab = Tab::from_tag(&args.tab);
    let query = args.query.join(" ");

    if ctx.verbose {
        let dim = Style::new().dim();
        eprintln!("{}", dim.apply_to(format!("Model: {}", llm.model())));
        eprintln!("{}", dim.apply_to(format!("Tab: {}", tab.title())));
    }

    let backend = OpenAiBackend::new(backend_config(&llm, credentials.groq_api_key))?;
    let client = SyncMcpClient::new(server.server_parameters(&credentials.eka));
    let config = OrchestratorConfig::default()
        .with_model(llm.model())
        .with_max_tokens(llm.max_tokens())
        .with_temperature(llm.temperature());

    let mut orchestrator = Orchestrator::new(Arc::new(backend), client, config)?
        .with_registry_builder(RegistryBuilder::new().with_excluded(server.excluded_tools));

    let outcome = orchestrator.generate_response(&query, tab);
    if let Err(e) = orchestrator.into_provider().close() {
        tracing::warn!(error = %e, "failed to close tool server");
    }
    let result = outcome?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.content);
    }

    Ok(())
}

fn backend_config(llm: &LlmConfig, api_key: String) -> OpenAiConfig {
    let mut config = OpenAiConfig::groq(api_key)
        .with_base_url(llm.base_url())
        .with_model(llm.model());
    if let Some(retries) = llm.retries {
        config = config.with_max_retries(retries);
    }
    if let Some(secs) = llm.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    config
}
