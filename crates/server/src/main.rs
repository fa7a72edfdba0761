//! Company Chat
//!
//! Entry point for the company question answering service.
//! `serve` runs the HTTP transport, `ask` answers one question and exits.

mod commands;
mod http;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ServeCommand};
use company_chat_core::config::{AppConfig, ConfigOverrides};
use company_chat_core::logging;
use std::path::PathBuf;

/// Company Chat - retrieval-first answers with human handoff
#[derive(Parser, Debug)]
#[command(name = "company-chat")]
#[command(about = "Retrieval-first company question answering", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Listening port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Bind address
    #[arg(long, global = true)]
    host: Option<String>,

    /// Retrieval service endpoint
    #[arg(long, global = true)]
    retrieval_url: Option<String>,

    /// Minimum retrieval score before a summary is attempted
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Generation provider (openai, ollama, mock)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Answer a single question and print the reply payload
    Ask(AskCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config file and environment first, flags on top
    let config = AppConfig::load_with_file(cli.config.as_deref())?.with_overrides(ConfigOverrides {
        port: cli.port,
        host: cli.host,
        retrieval_url: cli.retrieval_url,
        confidence_threshold: cli.threshold,
        provider: cli.provider,
        model: cli.model,
        log_level: cli.log_level,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {:#}", e);
    }

    result
}
