//! Lazy, load-once model handle

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::core::engine::{EngineProvider, TranslationEngine};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::TranslationRequest;

/// Holds the translation model for the lifetime of the process
pub struct ModelLoader {
    provider: Arc<dyn EngineProvider>,
    engine: RwLock<Option<Arc<dyn TranslationEngine>>>,
    load_lock: Mutex<()>,
}

impl ModelLoader {
    /// Create a loader; nothing is loaded until first use
    pub fn new(provider: Arc<dyn EngineProvider>) -> Self {
        Self {
            provider,
            engine: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    /// Identifier of the configured model
    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Check if the model handle is present
    pub async fn is_loaded(&self) -> bool {
        self.engine.read().await.is_some()
    }

    /// Name reported by the loaded engine
    pub async fn model_name(&self) -> Option<String> {
        self.engine
            .read()
            .await
            .as_ref()
            .map(|engine| engine.model_name().to_string())
    }

    /// Load the model if needed and return the shared handle.
    ///
    /// Concurrent callers wait for a single load. A failed load leaves the
    /// handle empty, so calling again retries.
    pub async fn load(&self) -> Result<Arc<dyn TranslationEngine>> {
        if let Some(engine) = self.engine.read().await.as_ref() {
            return Ok(engine.clone());
        }

        let _guard = self.load_lock.lock().await;

        // Another caller may have finished loading while we waited
        if let Some(engine) = self.engine.read().await.as_ref() {
            return Ok(engine.clone());
        }

        info!("Loading model {}", self.provider.model_id());
        let start = Instant::now();

        let provider = self.provider.clone();
        let loaded = tokio::task::spawn_blocking(move || provider.load())
            .await
            .map_err(|e| TranslationError::model_unavailable(format!("load task failed: {e}")))?;

        match loaded {
            Ok(engine) => {
                info!(
                    "Model {} ready in {:.1}s",
                    engine.model_name(),
                    start.elapsed().as_secs_f32()
                );
                *self.engine.write().await = Some(engine.clone());
                Ok(engine)
            }
            Err(e) => {
                warn!("Model load failed: {}", e);
                Err(e)
            }
        }
    }

    /// Translate, loading the model first if needed
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let engine = self.load().await?;

        let text = request.text.clone();
        let source = request.source_lang;
        let target = request.target_lang;
        debug!("Translating {} chars {} -> {}", text.chars().count(), source, target);

        let start = Instant::now();
        let translation = tokio::task::spawn_blocking(move || engine.translate(&text, source, target))
            .await
            .map_err(|e| TranslationError::inference(format!("translation task failed: {e}")))??;

        debug!("Translated in {:?}", start.elapsed());
        Ok(translation)
    }
}
