//! Chat controller: turns UI events into model calls and history updates

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::config::AppConfig;
use crate::core::engine::EngineProvider;
use crate::core::errors::{Result, TranslationError};
use crate::core::languages::{self, Language, LanguageCode};
use crate::core::loader::ModelLoader;
use crate::core::models::{ChatExchange, TranslationRequest};
use crate::core::nllb::NllbProvider;
use crate::core::session::{Phase, Session};

/// Everything the page needs to render itself
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    /// Configured model repository
    pub model_id: String,
    /// Whether the model is in memory
    pub model_loaded: bool,
    /// Name reported by the loaded engine
    pub model_name: Option<String>,
    /// Idle or translating
    pub phase: Phase,
    /// Selected source language
    pub source_lang: Language,
    /// Selected target language
    pub target_lang: Language,
    /// Exchanges in submission order
    pub history: Vec<ChatExchange>,
}

/// Owns the session and the model loader for one run of the UI
pub struct ChatController {
    loader: ModelLoader,
    session: Mutex<Session>,
    /// Serializes submissions: idle -> translating -> idle
    submit_lock: Mutex<()>,
}

impl ChatController {
    /// Create a controller with an empty history
    pub fn new(provider: Arc<dyn EngineProvider>, source: LanguageCode, target: LanguageCode) -> Self {
        Self {
            loader: ModelLoader::new(provider),
            session: Mutex::new(Session::new(source, target)),
            submit_lock: Mutex::new(()),
        }
    }

    /// Controller backed by the NLLB model described in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let (source, target) = config.default_languages()?;
        Ok(Self::new(
            Arc::new(NllbProvider::new(config.clone())),
            source,
            target,
        ))
    }

    /// Change the language selection; nothing changes if either is unsupported
    pub async fn select_languages(&self, source: &str, target: &str) -> Result<(LanguageCode, LanguageCode)> {
        let source = languages::resolve(source)?;
        let target = languages::resolve(target)?;

        self.session.lock().await.select(source, target);
        debug!("Selected {} -> {}", source, target);
        Ok((source, target))
    }

    /// Load the model now instead of on first submission
    pub async fn load_model(&self) -> Result<String> {
        let engine = self.loader.load().await?;
        Ok(engine.model_name().to_string())
    }

    /// Translate `text` and append the exchange to the history.
    ///
    /// `source` / `target` override the current selection and become the new
    /// selection. Empty text and unsupported languages are rejected before
    /// the model is touched; identical languages echo the text back.
    pub async fn submit(&self, text: &str, source: Option<&str>, target: Option<&str>) -> Result<ChatExchange> {
        let _turn = self.submit_lock.lock().await;

        if text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let request = {
            let mut session = self.session.lock().await;
            let (current_source, current_target) = session.selection();
            let source = source.map(languages::resolve).transpose()?.unwrap_or(current_source);
            let target = target.map(languages::resolve).transpose()?.unwrap_or(current_target);
            session.select(source, target);
            TranslationRequest::new(text, source, target)
        };

        if request.is_identity() {
            debug!("Source and target are both {}, echoing input", request.source_lang);
            let mut session = self.session.lock().await;
            return Ok(session.record(&request, request.text.clone()));
        }

        self.session.lock().await.set_phase(Phase::Translating);
        let result = self.loader.translate(&request).await;

        let mut session = self.session.lock().await;
        session.set_phase(Phase::Idle);

        match result {
            Ok(translation) if translation.trim().is_empty() => {
                warn!("Model returned an empty translation");
                Err(TranslationError::inference("model returned an empty translation"))
            }
            Ok(translation) => {
                let exchange = session.record(&request, translation);
                info!(
                    "Exchange #{}: {} -> {}",
                    exchange.id, request.source_lang, request.target_lang
                );
                Ok(exchange)
            }
            Err(e) => {
                warn!("Translation failed: {}", e);
                Err(e)
            }
        }
    }

    /// Drop the chat history, returning the number of exchanges removed
    pub async fn clear_history(&self) -> usize {
        let cleared = self.session.lock().await.clear();
        info!("Cleared {} exchanges", cleared);
        cleared
    }

    /// Number of exchanges in the history
    pub async fn history_len(&self) -> usize {
        self.session.lock().await.history().len()
    }

    /// Current state for rendering
    pub async fn snapshot(&self) -> SessionSnapshot {
        let model_loaded = self.loader.is_loaded().await;
        let model_name = self.loader.model_name().await;
        let session = self.session.lock().await;
        let (source, target) = session.selection();

        SessionSnapshot {
            model_id: self.loader.model_id().to_string(),
            model_loaded,
            model_name,
            phase: session.phase(),
            source_lang: source.language(),
            target_lang: target.language(),
            history: session.history().to_vec(),
        }
    }

    /// Whether the model handle is present
    pub async fn model_loaded(&self) -> bool {
        self.loader.is_loaded().await
    }
}
