//! Main entry point for the Lingo-Voice CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingo_voice::cli::commands::{self, Commands};
use lingo_voice::core::config::{AppConfig, Device};

/// Lingo-Voice - chat-style translation UI powered by NLLB-200
#[derive(Parser, Debug)]
#[command(name = "lingo-voice", version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON or TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inference device, overrides LINGO_DEVICE
    #[arg(long)]
    device: Option<Device>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", lingo_voice::NAME.replace('-', "_"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(device) = args.device {
        config.device = device;
    }

    // Execute command
    match args.command {
        Some(Commands::Serve {
            host,
            port,
            preload,
        }) => {
            commands::handle_serve(config, host, port, preload).await?;
        }
        Some(Commands::Languages { filter }) => {
            commands::handle_languages(filter)?;
        }
        Some(Commands::Translate {
            text,
            source,
            target,
        }) => {
            commands::handle_translate(config, text, source, target).await?;
        }
        None => {
            commands::handle_serve(config, None, None, false).await?;
        }
    }

    Ok(())
}
