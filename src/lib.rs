//! Lingo-Voice - chat-style translation UI for the NLLB-200 model
//!
//! This library provides the language catalog, lazy model loading, the chat
//! session controller and the local HTTP server behind the chat page.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    config::{AppConfig, Device},
    controller::{ChatController, SessionSnapshot},
    engine::{EngineProvider, TranslationEngine},
    errors::TranslationError,
    languages::{Language, LanguageCode},
    loader::ModelLoader,
    models::{ChatExchange, ChatTurn, Role, TranslationRequest},
    nllb::{NllbEngine, NllbProvider},
    session::{Phase, Session},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
