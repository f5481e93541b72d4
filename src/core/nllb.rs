//! NLLB-200 on ONNX Runtime
//!
//! Uses the encoder/decoder ONNX exports published next to `tokenizer.json`
//! on the Hugging Face hub. Files are fetched into the hub cache on first
//! use, or read from a local directory when `model_dir` is configured.
//!
//! Decoding is greedy: the decoder starts from `</s> <tgt_lang>` and the
//! most likely token is appended until `</s>` or the token limit.

use ndarray::{Array2, ArrayD, Axis, Ix3};
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::core::config::{AppConfig, Device};
use crate::core::engine::{EngineProvider, TranslationEngine};
use crate::core::errors::{Result, TranslationError};
use crate::core::languages::LanguageCode;

const TOKENIZER_FILE: &str = "tokenizer.json";
const EOS_TOKEN: &str = "</s>";
const FALLBACK_EOS_ID: u32 = 2;

/// Paths of everything the engine needs on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    /// `tokenizer.json`
    pub tokenizer: PathBuf,
    /// Encoder ONNX graph
    pub encoder: PathBuf,
    /// Decoder ONNX graph (no past key values)
    pub decoder: PathBuf,
}

impl ModelFiles {
    /// Repository-relative names of the (tokenizer, encoder, decoder) files
    pub fn remote_names(quantized: bool) -> [String; 3] {
        let suffix = if quantized { "_quantized" } else { "" };
        [
            TOKENIZER_FILE.to_string(),
            format!("onnx/encoder_model{}.onnx", suffix),
            format!("onnx/decoder_model{}.onnx", suffix),
        ]
    }

    /// Locate the files inside an already populated directory
    pub fn in_dir(dir: &Path, quantized: bool) -> Result<Self> {
        let [tokenizer, encoder, decoder] = Self::remote_names(quantized).map(|name| dir.join(name));

        for path in [&tokenizer, &encoder, &decoder] {
            if !path.is_file() {
                return Err(TranslationError::model_unavailable(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            tokenizer,
            encoder,
            decoder,
        })
    }

    /// Fetch the files through the hub cache, downloading what is missing
    pub fn from_hub(model_id: &str, cache_dir: Option<&Path>, quantized: bool) -> Result<Self> {
        let mut builder = hf_hub::api::sync::ApiBuilder::new().with_progress(false);
        if let Some(dir) = cache_dir {
            builder = builder.with_cache_dir(dir.to_path_buf());
        }
        let api = builder.build().map_err(TranslationError::model_unavailable)?;
        let repo = api.model(model_id.to_string());

        let mut paths = Vec::with_capacity(3);
        for name in Self::remote_names(quantized) {
            info!("Fetching {}/{}", model_id, name);
            let path = repo
                .get(&name)
                .map_err(|e| TranslationError::model_unavailable(format!("{}/{}: {}", model_id, name, e)))?;
            debug!("  -> {}", path.display());
            paths.push(path);
        }

        let decoder = paths.pop();
        let encoder = paths.pop();
        let tokenizer = paths.pop();
        match (tokenizer, encoder, decoder) {
            (Some(tokenizer), Some(encoder), Some(decoder)) => Ok(Self {
                tokenizer,
                encoder,
                decoder,
            }),
            _ => Err(TranslationError::model_unavailable("incomplete model download")),
        }
    }
}

/// Loads [`NllbEngine`] according to the application config
pub struct NllbProvider {
    config: AppConfig,
}

impl NllbProvider {
    /// Provider for the model described by `config`
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn resolve_files(&self) -> Result<ModelFiles> {
        match &self.config.model_dir {
            Some(dir) => {
                info!("Using local model files in {}", dir.display());
                ModelFiles::in_dir(dir, self.config.quantized)
            }
            None => ModelFiles::from_hub(
                &self.config.model_id,
                self.config.cache_dir.as_deref(),
                self.config.quantized,
            ),
        }
    }
}

impl EngineProvider for NllbProvider {
    fn load(&self) -> Result<Arc<dyn TranslationEngine>> {
        let files = self.resolve_files()?;
        let engine: Arc<dyn TranslationEngine> = Arc::new(NllbEngine::load(&files, &self.config)?);
        Ok(engine)
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }
}

/// Encoder/decoder sessions plus tokenizer
pub struct NllbEngine {
    encoder: Session,
    decoder: Session,
    tokenizer: Tokenizer,
    eos_id: u32,
    max_input_tokens: usize,
    max_new_tokens: usize,
    name: String,
}

impl NllbEngine {
    /// Build the ONNX Runtime sessions and read the tokenizer
    pub fn load(files: &ModelFiles, config: &AppConfig) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(|e| {
            TranslationError::model_unavailable(format!("failed to load tokenizer: {}", e))
        })?;
        let eos_id = tokenizer.token_to_id(EOS_TOKEN).unwrap_or(FALLBACK_EOS_ID);

        info!("Execution device: {}", config.device);
        let encoder = build_session(&files.encoder, config)?;
        let decoder = build_session(&files.decoder, config)?;

        let name = if config.quantized {
            format!("{} (int8)", config.model_id)
        } else {
            config.model_id.clone()
        };

        Ok(Self {
            encoder,
            decoder,
            tokenizer,
            eos_id,
            max_input_tokens: config.max_input_tokens,
            max_new_tokens: config.max_new_tokens,
            name,
        })
    }

    fn lang_token(&self, code: LanguageCode) -> Result<u32> {
        self.tokenizer
            .token_to_id(code.as_str())
            .ok_or_else(|| TranslationError::UnsupportedLanguage {
                code: code.as_str().to_string(),
            })
    }

    fn encode(&self, input_ids: &Array2<i64>, attention_mask: &Array2<i64>) -> Result<ArrayD<f32>> {
        let input_ids = Tensor::from_array(input_ids.clone()).map_err(TranslationError::inference)?;
        let attention_mask =
            Tensor::from_array(attention_mask.clone()).map_err(TranslationError::inference)?;

        let outputs = self
            .encoder
            .run(
                ort::inputs![
                    "input_ids" => input_ids,
                    "attention_mask" => attention_mask,
                ]
                .map_err(TranslationError::inference)?,
            )
            .map_err(TranslationError::inference)?;

        let hidden = outputs
            .get("last_hidden_state")
            .ok_or_else(|| TranslationError::inference("encoder returned no last_hidden_state"))?
            .try_extract_tensor::<f32>()
            .map_err(TranslationError::inference)?;

        Ok(hidden.to_owned())
    }

    fn next_token(
        &self,
        generated: &[i64],
        hidden: &ArrayD<f32>,
        attention_mask: &Array2<i64>,
    ) -> Result<i64> {
        let len = generated.len();
        let decoder_ids =
            Array2::from_shape_vec((1, len), generated.to_vec()).map_err(TranslationError::inference)?;

        let decoder_ids = Tensor::from_array(decoder_ids).map_err(TranslationError::inference)?;
        let hidden = Tensor::from_array(hidden.clone()).map_err(TranslationError::inference)?;
        let attention_mask =
            Tensor::from_array(attention_mask.clone()).map_err(TranslationError::inference)?;

        let outputs = self
            .decoder
            .run(
                ort::inputs![
                    "input_ids" => decoder_ids,
                    "encoder_hidden_states" => hidden,
                    "encoder_attention_mask" => attention_mask,
                ]
                .map_err(TranslationError::inference)?,
            )
            .map_err(TranslationError::inference)?;

        let logits = outputs
            .get("logits")
            .ok_or_else(|| TranslationError::inference("decoder returned no logits"))?
            .try_extract_tensor::<f32>()
            .map_err(TranslationError::inference)?
            .into_dimensionality::<Ix3>()
            .map_err(TranslationError::inference)?;

        let last = logits
            .index_axis_move(Axis(0), 0)
            .index_axis_move(Axis(0), len - 1);

        argmax(last.iter().copied())
            .map(|id| id as i64)
            .ok_or_else(|| TranslationError::inference("empty logits"))
    }
}

impl TranslationEngine for NllbEngine {
    fn translate(&self, text: &str, source: LanguageCode, target: LanguageCode) -> Result<String> {
        let src_lang_id = self.lang_token(source)?;
        let tgt_lang_id = self.lang_token(target)?;

        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(TranslationError::inference)?;
        if encoding.get_ids().len() + 2 > self.max_input_tokens {
            warn!(
                "Input of {} tokens truncated to {}",
                encoding.get_ids().len(),
                self.max_input_tokens
            );
        }

        let source_ids = source_ids(encoding.get_ids(), src_lang_id, self.eos_id, self.max_input_tokens);
        let len = source_ids.len();
        let input_ids = Array2::from_shape_vec((1, len), source_ids).map_err(TranslationError::inference)?;
        let attention_mask = Array2::<i64>::ones((1, len));

        let hidden = self.encode(&input_ids, &attention_mask)?;

        let eos = self.eos_id as i64;
        let mut generated = vec![eos, tgt_lang_id as i64];
        for _ in 0..self.max_new_tokens {
            let next = self.next_token(&generated, &hidden, &attention_mask)?;
            if next == eos {
                break;
            }
            generated.push(next);
        }

        let output_ids: Vec<u32> = generated[2..].iter().map(|&id| id as u32).collect();
        debug!("Generated {} tokens", output_ids.len());

        let translation = self
            .tokenizer
            .decode(&output_ids, true)
            .map_err(TranslationError::inference)?;

        Ok(translation.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

fn build_session(path: &Path, config: &AppConfig) -> Result<Session> {
    let unavailable =
        |e: ort::Error| TranslationError::model_unavailable(format!("{}: {}", path.display(), e));

    info!("Loading ONNX model {}", path.display());
    let builder = Session::builder()
        .map_err(unavailable)?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(unavailable)?
        .with_intra_threads(config.intra_threads)
        .map_err(unavailable)?;

    configure_device(builder, config.device)?
        .commit_from_file(path)
        .map_err(unavailable)
}

#[cfg(feature = "cuda")]
fn configure_device(builder: SessionBuilder, device: Device) -> Result<SessionBuilder> {
    use ort::execution_providers::CUDAExecutionProvider;

    match device {
        Device::Cuda => builder
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .map_err(TranslationError::model_unavailable),
        Device::Cpu => Ok(builder),
    }
}

#[cfg(not(feature = "cuda"))]
fn configure_device(builder: SessionBuilder, device: Device) -> Result<SessionBuilder> {
    if device == Device::Cuda {
        warn!("CUDA support not compiled in, running on CPU");
    }
    Ok(builder)
}

/// `<src_lang> tokens... </s>`, keeping at most `max_tokens` ids in total
fn source_ids(tokens: &[u32], src_lang_id: u32, eos_id: u32, max_tokens: usize) -> Vec<i64> {
    let keep = tokens.len().min(max_tokens.saturating_sub(2));
    let mut ids = Vec::with_capacity(keep + 2);
    ids.push(src_lang_id as i64);
    ids.extend(tokens[..keep].iter().map(|&id| id as i64));
    ids.push(eos_id as i64);
    ids
}

/// Index of the largest value; NaN is skipped
fn argmax(values: impl Iterator<Item = f32>) -> Option<usize> {
    values
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, v)| match best {
            Some((_, top)) if v <= top => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
