//! CLI command definitions and handlers

use clap::Subcommand;
use std::sync::Arc;
use tracing::{error, info};

use crate::core::config::AppConfig;
use crate::core::controller::ChatController;
use crate::core::languages;

/// Commands for Lingo-Voice
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the chat UI server (default)
    Serve {
        /// Bind address (default from config: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (default from config: 8501)
        #[arg(short, long)]
        port: Option<u16>,

        /// Load the model at startup instead of on first use
        #[arg(long)]
        preload: bool,
    },

    /// List supported languages
    Languages {
        /// Only show languages whose name or code contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Translate one message and exit
    Translate {
        /// Text to translate
        #[arg(short = 'x', long)]
        text: String,

        /// Source language code or name (default from config)
        #[arg(short, long)]
        source: Option<String>,

        /// Target language code or name (default from config)
        #[arg(short, long)]
        target: Option<String>,
    },
}

/// Handle server command
pub async fn handle_serve(
    config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    preload: bool,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);
    let controller = Arc::new(ChatController::from_config(&config)?);

    if preload {
        let controller = controller.clone();
        tokio::spawn(async move {
            match controller.load_model().await {
                Ok(name) => info!("Preloaded {}", name),
                Err(e) => error!("Preload failed, will retry on demand: {}", e),
            }
        });
    }

    info!("Starting chat UI on {}:{}", host, port);
    println!("🌍 Lingo-Voice running on http://{}:{}", host, port);
    println!("   Model: {} (device: {})", config.model_id, config.device);

    run_server(controller, &host, port).await?;

    Ok(())
}

/// Handle languages command
pub fn handle_languages(filter: Option<String>) -> anyhow::Result<()> {
    let matches = languages::search(filter.as_deref().unwrap_or(""));

    if matches.is_empty() {
        anyhow::bail!("No languages match '{}'", filter.unwrap_or_default());
    }

    for language in &matches {
        println!("{:<10} {}", language.code, language.name);
    }
    println!("\n{} of {} languages", matches.len(), languages::count());

    Ok(())
}

/// Handle one-shot translate command
pub async fn handle_translate(
    config: AppConfig,
    text: String,
    source: Option<String>,
    target: Option<String>,
) -> anyhow::Result<()> {
    let controller = ChatController::from_config(&config)?;

    let exchange = controller
        .submit(&text, source.as_deref(), target.as_deref())
        .await?;

    info!(
        "Translated {} -> {}",
        exchange.user.source_lang(),
        exchange.user.target_lang()
    );
    println!("{}", exchange.assistant.text());

    Ok(())
}
