//! Tools command - list the catalogue server's tools.

use anyhow::Result;
use clap::Args;
use console::Style;
use medassist_agent::RegistryBuilder;
use medassist_config::EkaCredentials;
use medassist_mcp::with_client;

use super::Context;

/// Arguments for the tools command.
#[derive(Args, Debug)]
pub struct ToolsArgs {
    /// Include tools that are never offered to the model
    #[arg(long)]
    pub all: bool,
}

/// Run the tools command.
pub fn run(args: ToolsArgs, ctx: &Context) -> Result<()> {
    let credentials = EkaCredentials::from_env()?;
    let server = ctx.config.tool_server();
    let builder = RegistryBuilder::new().with_excluded(server.excluded_tools.clone());

    let tools = with_client(server.server_parameters(&credentials), |client| {
        client.list_tools()
    })?;
    let tools: Vec<_> = tools
        .into_iter()
        .filter(|t| args.all || !builder.excludes(&t.name))
        .collect();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    if tools.is_empty() {
        println!("No tools available.");
        return Ok(());
    }

    let bold = Style::new().bold();
    let dim = Style::new().dim();
    for tool in &tools {
        match tool.description.as_deref() {
            Some(description) => println!(
                "{}  {}",
                bold.apply_to(&tool.name),
                dim.apply_to(description)
            ),
            None => println!("{}", bold.apply_to(&tool.name)),
        }
    }

    Ok(())
}
