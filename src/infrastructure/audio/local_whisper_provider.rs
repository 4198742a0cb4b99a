use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{
    ProviderError, SpeechModel, TimedSpan, TranscriptionProvider,
};
use crate::application::services::{SegmentSource, normalize_segments};
use crate::domain::{LanguageHint, TranscriptResult, UploadedMedia, resolve_language_code};

impl SegmentSource for TimedSpan {
    fn start(&self) -> Option<f64> {
        Some(self.start)
    }

    fn end(&self) -> Option<f64> {
        Some(self.start + self.duration)
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }
}

/// Runs the shared local model on the scratch file.
pub struct LocalWhisperProvider {
    model: Arc<dyn SpeechModel>,
}

impl LocalWhisperProvider {
    pub fn new(model: Arc<dyn SpeechModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl TranscriptionProvider for LocalWhisperProvider {
    fn name(&self) -> &'static str {
        "local-whisper"
    }

    async fn transcribe(
        &self,
        media: &UploadedMedia,
        language: &LanguageHint,
    ) -> Result<TranscriptResult, ProviderError> {
        if !tokio::fs::try_exists(&media.storage_path)
            .await
            .unwrap_or(false)
        {
            return Err(ProviderError::upstream(format!(
                "media file unavailable: {}",
                media.storage_path.display()
            )));
        }

        let model = Arc::clone(&self.model);
        let path = media.storage_path.clone();
        let hint = language.as_provider_hint().map(str::to_string);

        tracing::debug!(model = %self.model.model_id(), "Running local Whisper model");

        let transcript =
            tokio::task::spawn_blocking(move || model.transcribe_file(&path, hint.as_deref()))
                .await
                .map_err(|e| ProviderError::upstream(format!("task join error: {}", e)))?
                .map_err(|e| ProviderError::upstream(e.to_string()))?;

        let segments = normalize_segments(&transcript.spans);
        let language_code = resolve_language_code(transcript.language.as_deref(), language);

        tracing::info!(
            segments = segments.len(),
            chars = transcript.text.len(),
            language = %language_code,
            "Local Whisper transcription completed"
        );

        Ok(TranscriptResult::from_parts(
            &transcript.text,
            language_code,
            segments,
        ))
    }
}
