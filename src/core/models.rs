//! Core data models for the translation chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::languages::LanguageCode;

/// Who produced a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the user
    User,
    /// Translation produced by the model
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the chat, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    role: Role,
    text: String,
    source_lang: LanguageCode,
    target_lang: LanguageCode,
    timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a turn stamped with the current time
    pub fn new(role: Role, text: impl Into<String>, request: &TranslationRequest) -> Self {
        Self {
            role,
            text: text.into(),
            source_lang: request.source_lang,
            target_lang: request.target_lang,
            timestamp: Utc::now(),
        }
    }

    /// Author of the turn
    pub fn role(&self) -> Role {
        self.role
    }

    /// Message text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Language the exchange was translated from
    pub fn source_lang(&self) -> LanguageCode {
        self.source_lang
    }

    /// Language the exchange was translated into
    pub fn target_lang(&self) -> LanguageCode {
        self.target_lang
    }

    /// Creation time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// The user and assistant turns of one successful submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatExchange {
    /// Sequence number within the session, starting at 1
    pub id: u64,
    /// What the user typed
    pub user: ChatTurn,
    /// What the model answered
    pub assistant: ChatTurn,
}

/// Translation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationRequest {
    /// Text as typed
    pub text: String,
    /// Language of `text`
    pub source_lang: LanguageCode,
    /// Language to translate into
    pub target_lang: LanguageCode,
}

impl TranslationRequest {
    /// Create a request
    pub fn new(text: impl Into<String>, source_lang: LanguageCode, target_lang: LanguageCode) -> Self {
        Self {
            text: text.into(),
            source_lang,
            target_lang,
        }
    }

    /// Source and target are the same language
    pub fn is_identity(&self) -> bool {
        self.source_lang == self.target_lang
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::languages::resolve;

    #[test]
    fn test_turn_carries_request_languages() {
        let request = TranslationRequest::new(
            "Hello",
            resolve("eng_Latn").unwrap(),
            resolve("fra_Latn").unwrap(),
        );
        let turn = ChatTurn::new(Role::Assistant, "Bonjour", &request);

        assert_eq!(turn.role(), Role::Assistant);
        assert_eq!(turn.text(), "Bonjour");
        assert_eq!(turn.source_lang().as_str(), "eng_Latn");
        assert_eq!(turn.target_lang().as_str(), "fra_Latn");
        assert!(turn.timestamp() <= Utc::now());
    }

    #[test]
    fn test_turn_serializes_lowercase_role() {
        let request = TranslationRequest::new(
            "Hi",
            resolve("English").unwrap(),
            resolve("German").unwrap(),
        );
        let json = serde_json::to_value(ChatTurn::new(Role::User, "Hi", &request)).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["source_lang"], "eng_Latn");
        assert_eq!(json["target_lang"], "deu_Latn");
    }

    #[test]
    fn test_identity_request() {
        let eng = resolve("eng_Latn").unwrap();
        assert!(TranslationRequest::new("x", eng, eng).is_identity());
        assert!(!TranslationRequest::new("x", eng, resolve("spa_Latn").unwrap()).is_identity());
    }
}
