//! MedAssist - medication questions answered with live catalogue tools
//!
//! Main entry point for the MedAssist CLI.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;

mod commands;

use commands::{ask, tools};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// MedAssist - medication questions answered with live catalogue tools
#[derive(Parser)]
#[command(name = "medassist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to use instead of the discovered ones
    #[arg(long, global = true, env = "MEDASSIST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a one-shot medication question
    Ask(ask::AskArgs),

    /// List the tools the catalogue server exposes
    Tools(tools::ToolsArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "medassist=debug,medassist_agent=debug,medassist_llm=debug,medassist_mcp=debug,medassist_config=debug,info"
    } else {
        "medassist=info,medassist_agent=info,medassist_llm=info,medassist_mcp=info,medassist_config=info,warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = commands::error_kind(&e), error = %e, "command failed");
            let red = Style::new().red();
            eprintln!(
                "{} Sorry, something went wrong. Please try again.",
                red.apply_to("Error:")
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    medassist_config::load_dotenv();

    let ctx = commands::Context::load(cli.config.as_deref(), cli.json, cli.verbose)?;

    match cli.command {
        Commands::Ask(args) => ask::run(args, &ctx),
        Commands::Tools(args) => tools::run(args, &ctx),
    }
}
