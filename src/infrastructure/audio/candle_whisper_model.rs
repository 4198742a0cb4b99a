use std::path::Path;
use std::sync::Mutex;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::application::ports::{LocalTranscript, SpeechModel, SpeechModelError, TimedSpan};

use super::audio_decoder::MediaAudioReader;

pub const DEFAULT_LOCAL_MODEL_ID: &str = "openai/whisper-base";

const MEL_FILTERS_REPO: &str = "FL33TW00D-HF/whisper-base";
const MAX_DECODE_TOKENS: usize = 224;
const SECONDS_PER_TIMESTAMP_TOKEN: f64 = 0.02;
const CHUNK_SECONDS: f64 = m::CHUNK_LENGTH as f64;

/// Whisper weights pulled from the Hugging Face hub and run on the CPU.
///
/// One instance is loaded at startup and shared by every request; decoding
/// is serialized behind the model lock.
pub struct CandleWhisperModel {
    model_id: String,
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    mel_filters: Vec<f32>,
}

impl CandleWhisperModel {
    pub fn new(model_id: &str) -> Result<Self, SpeechModelError> {
        let device = Device::Cpu;

        tracing::info!(
            device = ?device,
            model = model_id,
            "Loading Candle Whisper model"
        );

        let api = Api::new().map_err(|e| SpeechModelError::ModelLoadFailed(e.to_string()))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("config.json: {}", e)))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("tokenizer.json: {}", e)))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("model.safetensors: {}", e)))?;

        let mel_repo = api.repo(Repo::new(MEL_FILTERS_REPO.to_string(), RepoType::Model));
        let mel_bytes_path = mel_repo
            .get("melfilters.bytes")
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("melfilters.bytes: {}", e)))?;

        let config_contents = std::fs::read_to_string(&config_path)
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("tokenizer: {}", e)))?;

        let mel_bytes = std::fs::read(&mel_bytes_path)
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("mel filters: {}", e)))?;
        let mel_filters = read_mel_filters(&mel_bytes, &config)?;

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], m::DTYPE, &device)
                .map_err(|e| SpeechModelError::ModelLoadFailed(format!("weights: {}", e)))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| SpeechModelError::ModelLoadFailed(format!("model: {}", e)))?;

        tracing::info!(model = model_id, "Candle Whisper model loaded");

        Ok(Self {
            model_id: model_id.to_string(),
            model: Mutex::new(model),
            tokenizer,
            config,
            device,
            mel_filters,
        })
    }

    fn mel_for_chunk(&self, chunk: &[f32]) -> Result<Tensor, SpeechModelError> {
        let mut samples = chunk.to_vec();
        samples.resize(m::N_SAMPLES, 0.0);

        let mel_data = m::audio::pcm_to_mel(&self.config, &samples, &self.mel_filters);
        let n_mel = self.config.num_mel_bins;
        let n_frames = mel_data.len() / n_mel;

        Tensor::from_vec(mel_data, (1, n_mel, n_frames), &self.device)
            .map_err(|e| SpeechModelError::InferenceFailed(format!("mel tensor: {}", e)))
    }
}

impl SpeechModel for CandleWhisperModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn transcribe_file(
        &self,
        path: &Path,
        language: Option<&str>,
    ) -> Result<LocalTranscript, SpeechModelError> {
        let mut reader = MediaAudioReader::open(path)?;
        let tokens = SpecialTokens::resolve(&self.tokenizer, language)?;

        let mut spans = Vec::new();
        let mut index = 0usize;
        while let Some(chunk) = reader.next_window(m::N_SAMPLES)? {
            tracing::debug!(chunk = index, samples = chunk.len(), "Decoding audio chunk");

            let mel = self.mel_for_chunk(&chunk)?;
            let generated = {
                let mut model = self.model.lock().map_err(|_| {
                    SpeechModelError::InferenceFailed("model lock poisoned".to_string())
                })?;
                decode_chunk(&mut model, &tokens, &self.device, &mel)?
            };

            let offset = index as f64 * CHUNK_SECONDS;
            let chunk_seconds = chunk.len() as f64 / m::SAMPLE_RATE as f64;
            spans.extend(spans_from_tokens(
                &self.tokenizer,
                &generated,
                tokens.no_timestamps,
                offset,
                chunk_seconds,
            )?);
            index += 1;
        }

        let text = spans
            .iter()
            .map(|span| span.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(LocalTranscript {
            text,
            language: language.map(str::to_string),
            spans,
        })
    }
}

struct SpecialTokens {
    prompt: Vec<u32>,
    no_timestamps: u32,
    eot: u32,
}

impl SpecialTokens {
    fn resolve(tokenizer: &Tokenizer, language: Option<&str>) -> Result<Self, SpeechModelError> {
        let mut prompt = vec![token_id(tokenizer, m::SOT_TOKEN)?];

        if let Some(code) = language {
            match tokenizer.token_to_id(&format!("<|{}|>", code)) {
                Some(id) => prompt.push(id),
                None => tracing::warn!(language = code, "Model has no token for language hint"),
            }
        }

        prompt.push(token_id(tokenizer, m::TRANSCRIBE_TOKEN)?);

        Ok(Self {
            prompt,
            no_timestamps: token_id(tokenizer, m::NO_TIMESTAMPS_TOKEN)?,
            eot: token_id(tokenizer, m::EOT_TOKEN)?,
        })
    }
}

fn decode_chunk(
    model: &mut m::model::Whisper,
    special: &SpecialTokens,
    device: &Device,
    mel: &Tensor,
) -> Result<Vec<u32>, SpeechModelError> {
    let audio_features = model
        .encoder
        .forward(mel, true)
        .map_err(|e| SpeechModelError::InferenceFailed(format!("encoder: {}", e)))?;

    let prompt_len = special.prompt.len();
    let mut tokens = special.prompt.clone();

    for _ in 0..MAX_DECODE_TOKENS {
        let token_tensor = Tensor::new(tokens.as_slice(), device)
            .map_err(|e| SpeechModelError::InferenceFailed(e.to_string()))?
            .unsqueeze(0)
            .map_err(|e| SpeechModelError::InferenceFailed(e.to_string()))?;

        let decoder_output = model
            .decoder
            .forward(&token_tensor, &audio_features, tokens.len() == prompt_len)
            .map_err(|e| SpeechModelError::InferenceFailed(format!("decoder: {}", e)))?;

        let logits = model
            .decoder
            .final_linear(
                &decoder_output
                    .squeeze(0)
                    .map_err(|e| SpeechModelError::InferenceFailed(e.to_string()))?,
            )
            .map_err(|e| SpeechModelError::InferenceFailed(format!("linear: {}", e)))?;

        let seq_len = logits
            .dim(0)
            .map_err(|e| SpeechModelError::InferenceFailed(e.to_string()))?;
        let next_token = logits
            .get(seq_len - 1)
            .map_err(|e| SpeechModelError::InferenceFailed(e.to_string()))?
            .argmax(0)
            .map_err(|e| SpeechModelError::InferenceFailed(e.to_string()))?
            .to_scalar::<u32>()
            .map_err(|e| SpeechModelError::InferenceFailed(e.to_string()))?;

        if next_token == special.eot {
            break;
        }

        tokens.push(next_token);
    }

    model.reset_kv_cache();

    Ok(tokens.split_off(prompt_len))
}

/// Pairs timestamp tokens around text runs. Text with no closing timestamp
/// runs to the end of the chunk.
fn spans_from_tokens(
    tokenizer: &Tokenizer,
    generated: &[u32],
    no_timestamps: u32,
    offset: f64,
    chunk_seconds: f64,
) -> Result<Vec<TimedSpan>, SpeechModelError> {
    let mut spans = Vec::new();
    let mut start: Option<f64> = None;
    let mut text_tokens: Vec<u32> = Vec::new();

    for &token in generated {
        if token > no_timestamps {
            let at = (token - no_timestamps - 1) as f64 * SECONDS_PER_TIMESTAMP_TOKEN;
            if text_tokens.is_empty() {
                start = Some(at);
                continue;
            }
            let from = start.unwrap_or(0.0);
            spans.push(TimedSpan {
                start: offset + from,
                duration: (at - from).max(0.0),
                text: decode_text(tokenizer, &text_tokens)?,
            });
            text_tokens.clear();
            start = None;
        } else {
            text_tokens.push(token);
        }
    }

    if !text_tokens.is_empty() {
        let from = start.unwrap_or(0.0);
        spans.push(TimedSpan {
            start: offset + from,
            duration: (chunk_seconds - from).max(0.0),
            text: decode_text(tokenizer, &text_tokens)?,
        });
    }

    Ok(spans)
}

fn decode_text(tokenizer: &Tokenizer, tokens: &[u32]) -> Result<String, SpeechModelError> {
    tokenizer
        .decode(tokens, true)
        .map_err(|e| SpeechModelError::InferenceFailed(format!("detokenize: {}", e)))
}

fn token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, SpeechModelError> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| SpeechModelError::InferenceFailed(format!("token not found: {}", token)))
}

fn read_mel_filters(bytes: &[u8], config: &Config) -> Result<Vec<f32>, SpeechModelError> {
    let expected_len = config.num_mel_bins * (m::N_FFT / 2 + 1);
    if bytes.len() < expected_len * 4 {
        return Err(SpeechModelError::ModelLoadFailed(format!(
            "mel filters file too small: {} bytes, expected at least {}",
            bytes.len(),
            expected_len * 4
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .take(expected_len)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
