use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{ProviderError, TranscriptionProvider};
use crate::application::services::{SegmentSource, normalize_segments};
use crate::domain::{LanguageHint, TranscriptResult, UploadedMedia, resolve_language_code};

/// Hard request limit of the hosted transcription API.
pub const OPENAI_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "whisper-1";

pub struct OpenAiWhisperProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_upload_bytes: u64,
}

impl OpenAiWhisperProvider {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            max_upload_bytes: OPENAI_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

#[derive(Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Deserialize)]
struct VerboseSegment {
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    text: Option<String>,
}

impl SegmentSource for VerboseSegment {
    fn start(&self) -> Option<f64> {
        self.start
    }

    fn end(&self) -> Option<f64> {
        self.end
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[async_trait]
impl TranscriptionProvider for OpenAiWhisperProvider {
    fn name(&self) -> &'static str {
        "openai-whisper"
    }

    async fn transcribe(
        &self,
        media: &UploadedMedia,
        language: &LanguageHint,
    ) -> Result<TranscriptResult, ProviderError> {
        let metadata = tokio::fs::metadata(&media.storage_path)
            .await
            .map_err(|e| ProviderError::upstream(format!("media file unavailable: {}", e)))?;

        if metadata.len() > self.max_upload_bytes {
            return Err(ProviderError::payload_too_large(format!(
                "{} bytes exceeds the {} byte limit",
                metadata.len(),
                self.max_upload_bytes
            )));
        }

        let file = tokio::fs::File::open(&media.storage_path)
            .await
            .map_err(|e| ProviderError::upstream(format!("open media: {}", e)))?;

        let file_part = multipart::Part::stream_with_length(file, metadata.len())
            .file_name(media.sanitized_filename.clone())
            .mime_str(media.extension.content_type())
            .map_err(|e| ProviderError::upstream(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .part("file", file_part);

        if let Some(code) = language.as_provider_hint() {
            form = form.text("language", code.to_string());
        }

        let url = format!("{}/audio/transcriptions", self.base_url);

        tracing::debug!(
            model = %self.model,
            bytes = metadata.len(),
            content_type = media.extension.content_type(),
            "Sending audio to OpenAI Whisper API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::upstream(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ProviderError::upstream(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| ProviderError::upstream(format!("parse response: {}", e)))?;

        let segments = normalize_segments(&body.segments);
        let language_code = resolve_language_code(body.language.as_deref(), language);

        tracing::info!(
            segments = segments.len(),
            chars = body.text.len(),
            language = %language_code,
            "OpenAI Whisper transcription completed"
        );

        Ok(TranscriptResult::from_parts(
            &body.text,
            language_code,
            segments,
        ))
    }
}
