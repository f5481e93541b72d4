//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Model could not be downloaded or loaded; loading may be retried
    #[error("Model unavailable: {message}")]
    ModelUnavailable {
        /// Underlying cause reported by the loader
        message: String,
    },

    /// Submitted text was empty or whitespace only
    #[error("Please enter some text to translate")]
    EmptyInput,

    /// Request body could not be parsed
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Parser message
        message: String,
    },

    /// Language code outside the supported catalog
    #[error("Unsupported language: {code}")]
    UnsupportedLanguage {
        /// The rejected code or name as given
        code: String,
    },

    /// Model failed while generating a translation
    #[error("Inference error: {message}")]
    InferenceError {
        /// Underlying cause reported by the runtime
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What was wrong with the configuration
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    /// Shorthand for a load failure
    pub fn model_unavailable(message: impl ToString) -> Self {
        TranslationError::ModelUnavailable {
            message: message.to_string(),
        }
    }

    /// Shorthand for a generation failure
    pub fn inference(message: impl ToString) -> Self {
        TranslationError::InferenceError {
            message: message.to_string(),
        }
    }

    /// True for input the controller rejects before the model is involved
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TranslationError::EmptyInput
                | TranslationError::InvalidRequest { .. }
                | TranslationError::UnsupportedLanguage { .. }
        )
    }

    /// Stable machine-readable error code
    pub fn kind(&self) -> &'static str {
        match self {
            TranslationError::ModelUnavailable { .. } => "model_unavailable",
            TranslationError::EmptyInput => "empty_input",
            TranslationError::InvalidRequest { .. } => "invalid_request",
            TranslationError::UnsupportedLanguage { .. } => "unsupported_language",
            TranslationError::InferenceError { .. } => "inference_error",
            TranslationError::ConfigError { .. } => "config_error",
            TranslationError::IoError(_) => "io_error",
            TranslationError::JsonError(_) => "json_error",
        }
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(err: config::ConfigError) -> Self {
        TranslationError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_classified() {
        assert!(TranslationError::EmptyInput.is_rejection());
        assert!(TranslationError::UnsupportedLanguage {
            code: "xx".to_string()
        }
        .is_rejection());
        assert!(TranslationError::InvalidRequest {
            message: "missing field `text`".to_string()
        }
        .is_rejection());
        assert!(!TranslationError::model_unavailable("offline").is_rejection());
        assert!(!TranslationError::inference("bad shape").is_rejection());
    }

    #[test]
    fn test_display_carries_cause() {
        let err = TranslationError::model_unavailable("connection refused");
        assert_eq!(err.to_string(), "Model unavailable: connection refused");
        assert_eq!(err.kind(), "model_unavailable");

        let err = TranslationError::UnsupportedLanguage {
            code: "klingon".to_string(),
        };
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TranslationError = io_err.into();
        assert_eq!(err.kind(), "io_error");
    }
}
