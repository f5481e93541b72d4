//! Configuration management

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::languages::{self, LanguageCode};

/// Prefix for environment overrides, e.g. `LINGO_DEVICE=cuda`
pub const ENV_PREFIX: &str = "LINGO";

/// ONNX export of facebook/nllb-200-distilled-600M
const DEFAULT_MODEL_ID: &str = "Xenova/nllb-200-distilled-600M";

/// Position limit of the NLLB encoder
const MAX_POSITIONS: usize = 1024;

/// Inference device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// ONNX Runtime CPU provider
    #[default]
    Cpu,
    /// ONNX Runtime CUDA provider (needs the `cuda` feature)
    #[serde(alias = "gpu")]
    Cuda,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
        }
    }
}

impl FromStr for Device {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda),
            other => Err(TranslationError::ConfigError {
                message: format!("unknown device '{}', expected cpu or cuda", other),
            }),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Hugging Face repository holding tokenizer.json and the onnx/ exports
    pub model_id: String,
    /// Directory with already downloaded model files; skips the hub
    pub model_dir: Option<PathBuf>,
    /// Override for the hub cache directory
    pub cache_dir: Option<PathBuf>,
    /// Use the int8 quantized exports
    pub quantized: bool,
    /// Execution device for both sessions
    pub device: Device,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
    /// Longer inputs are truncated
    pub max_input_tokens: usize,
    /// Generation stops after this many tokens
    pub max_new_tokens: usize,
    /// Initial source language, code or name
    pub default_source_lang: String,
    /// Initial target language, code or name
    pub default_target_lang: String,
    /// Bind address of the UI server
    pub host: String,
    /// Listen port of the UI server
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_dir: None,
            cache_dir: None,
            quantized: false,
            device: Device::Cpu,
            intra_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_input_tokens: 512,
            max_new_tokens: 256,
            default_source_lang: languages::DEFAULT_SOURCE.to_string(),
            default_target_lang: languages::DEFAULT_TARGET.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl AppConfig {
    /// Load defaults, then the optional file, then `LINGO_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`AppConfig::load`] but reads overrides from `env` instead of the process
    /// environment when given
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() && self.model_dir.is_none() {
            return Err(config_error("model_id or model_dir is required"));
        }

        if self.intra_threads == 0 {
            return Err(config_error("intra_threads must be greater than 0"));
        }

        // room for the language tag and </s>
        if self.max_input_tokens < 3 || self.max_input_tokens > MAX_POSITIONS {
            return Err(config_error(format!(
                "max_input_tokens must be between 3 and {}",
                MAX_POSITIONS
            )));
        }

        // the decoder prefix is </s> <tgt_lang> followed by the generated tokens
        if self.max_new_tokens == 0 || self.max_new_tokens > MAX_POSITIONS - 2 {
            return Err(config_error(format!(
                "max_new_tokens must be between 1 and {}",
                MAX_POSITIONS - 2
            )));
        }

        if self.host.trim().is_empty() {
            return Err(config_error("host is required"));
        }

        self.default_languages()?;

        if self.device == Device::Cuda && !cfg!(feature = "cuda") {
            warn!("device=cuda requested but built without the cuda feature; CPU will be used");
        }

        Ok(())
    }

    /// Configured default (source, target) selection
    pub fn default_languages(&self) -> Result<(LanguageCode, LanguageCode)> {
        let source = languages::resolve(&self.default_source_lang)?;
        let target = languages::resolve(&self.default_target_lang)?;
        Ok((source, target))
    }
}

fn config_error(message: impl Into<String>) -> TranslationError {
    TranslationError::ConfigError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        let (source, target) = config.default_languages().unwrap();
        assert_eq!(source.as_str(), "eng_Latn");
        assert_eq!(target.as_str(), "spa_Latn");
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let config = AppConfig {
            max_new_tokens: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            max_input_tokens: 4096,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            max_new_tokens: MAX_POSITIONS - 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TranslationError::ConfigError { .. })));

        let config = AppConfig {
            max_new_tokens: MAX_POSITIONS - 2,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = AppConfig {
            max_input_tokens: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            default_target_lang: "Klingon".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TranslationError::UnsupportedLanguage { .. })
        ));

        let config = AppConfig {
            model_id: "".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_defaults() {
        let config = AppConfig::load_with_env(None, env(&[])).unwrap();
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.port, 8501);
        assert_eq!(config.device, Device::Cpu);
        assert!(config.model_dir.is_none());
    }

    #[test]
    fn test_load_env_overrides() {
        let config = AppConfig::load_with_env(
            None,
            env(&[
                ("LINGO_DEVICE", "cuda"),
                ("LINGO_PORT", "9000"),
                ("LINGO_QUANTIZED", "true"),
                ("LINGO_DEFAULT_TARGET_LANG", "fra_Latn"),
            ]),
        )
        .unwrap();

        assert_eq!(config.device, Device::Cuda);
        assert_eq!(config.port, 9000);
        assert!(config.quantized);
        assert_eq!(config.default_target_lang, "fra_Latn");
    }

    #[test]
    fn test_load_file_then_env() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"port": 7000, "max_new_tokens": 64, "model_dir": "/opt/nllb"}}"#
        )
        .unwrap();

        let config =
            AppConfig::load_with_env(Some(file.path()), env(&[("LINGO_PORT", "7100")])).unwrap();

        assert_eq!(config.port, 7100);
        assert_eq!(config.max_new_tokens, 64);
        assert_eq!(config.model_dir, Some(PathBuf::from("/opt/nllb")));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = AppConfig::load_with_env(Some(Path::new("/nonexistent/lingo.toml")), env(&[]));
        assert!(matches!(result, Err(TranslationError::ConfigError { .. })));
    }

    #[test]
    fn test_device_from_str() {
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("gpu".parse::<Device>().unwrap(), Device::Cuda);
        assert!("tpu".parse::<Device>().is_err());
    }
}
