//! In-memory chat session state

use serde::Serialize;
use std::fmt;

use crate::core::languages::LanguageCode;
use crate::core::models::{ChatExchange, ChatTurn, Role, TranslationRequest};

/// What the session is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Waiting for input
    Idle,
    /// A submission is inside the model
    Translating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Translating => write!(f, "translating"),
        }
    }
}

/// Language selection plus chat history for one run of the UI
#[derive(Debug, Clone)]
pub struct Session {
    source_lang: LanguageCode,
    target_lang: LanguageCode,
    phase: Phase,
    history: Vec<ChatExchange>,
    next_id: u64,
}

impl Session {
    /// Empty history with the given selection
    pub fn new(source_lang: LanguageCode, target_lang: LanguageCode) -> Self {
        Self {
            source_lang,
            target_lang,
            phase: Phase::Idle,
            history: Vec::new(),
            next_id: 1,
        }
    }

    /// Currently selected (source, target)
    pub fn selection(&self) -> (LanguageCode, LanguageCode) {
        (self.source_lang, self.target_lang)
    }

    /// Replace the selection
    pub fn select(&mut self, source_lang: LanguageCode, target_lang: LanguageCode) {
        self.source_lang = source_lang;
        self.target_lang = target_lang;
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to `phase`
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Append the exchange for a completed translation
    pub fn record(&mut self, request: &TranslationRequest, translation: impl Into<String>) -> ChatExchange {
        let exchange = ChatExchange {
            id: self.next_id,
            user: ChatTurn::new(Role::User, request.text.clone(), request),
            assistant: ChatTurn::new(Role::Assistant, translation, request),
        };
        self.next_id += 1;
        self.history.push(exchange.clone());
        exchange
    }

    /// Exchanges in submission order
    pub fn history(&self) -> &[ChatExchange] {
        &self.history
    }

    /// Drop all exchanges, returning how many there were
    pub fn clear(&mut self) -> usize {
        let cleared = self.history.len();
        self.history.clear();
        cleared
    }
}
