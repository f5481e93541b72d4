//! Translation engine seam
//!
//! The chat layer never talks to a model runtime directly. It holds an
//! [`EngineProvider`] that knows how to load an engine, and the loaded
//! [`TranslationEngine`] that turns text into text.

use std::sync::Arc;

use crate::core::errors::Result;
use crate::core::languages::LanguageCode;

/// Loaded translation model
pub trait TranslationEngine: Send + Sync {
    /// Translate text from source language to target language. Blocking.
    fn translate(&self, text: &str, source: LanguageCode, target: LanguageCode) -> Result<String>;

    /// Human readable model name
    fn model_name(&self) -> &str;
}

/// Knows how to acquire a [`TranslationEngine`]
pub trait EngineProvider: Send + Sync {
    /// Download and/or load the model. Blocking, may take minutes on first run.
    fn load(&self) -> Result<Arc<dyn TranslationEngine>>;

    /// Identifier of the model this provider loads
    fn model_id(&self) -> &str;
}
