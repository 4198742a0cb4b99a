use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::application::ports::{SpeechModel, SpeechModelError, TranscriptionProvider};
use crate::application::services::TranscriptionDispatcher;

use super::candle_whisper_model::CandleWhisperModel;
use super::local_whisper_provider::LocalWhisperProvider;
use super::openai_whisper_provider::OpenAiWhisperProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryProvider {
    Remote,
    #[default]
    Local,
}

#[derive(Debug, Clone)]
pub struct RemoteProviderConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_upload_bytes: u64,
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn load_local_model(model_id: &str) -> Result<Arc<dyn SpeechModel>, SpeechModelError> {
        let model = CandleWhisperModel::new(model_id)?;
        Ok(Arc::new(model))
    }

    pub fn create_remote(config: RemoteProviderConfig) -> Arc<dyn TranscriptionProvider> {
        let provider = OpenAiWhisperProvider::new(config.api_key, config.base_url, config.model)
            .with_max_upload_bytes(config.max_upload_bytes);
        Arc::new(provider)
    }

    pub fn create_local(model: Arc<dyn SpeechModel>) -> Arc<dyn TranscriptionProvider> {
        Arc::new(LocalWhisperProvider::new(model))
    }

    /// `remote` is `None` unless the remote provider is primary and fully configured.
    pub fn create_dispatcher(
        remote: Option<RemoteProviderConfig>,
        model: Arc<dyn SpeechModel>,
        timeout: Duration,
    ) -> TranscriptionDispatcher {
        let remote = remote.map(Self::create_remote);

        tracing::info!(
            remote_enabled = remote.is_some(),
            local_model = %model.model_id(),
            timeout_secs = timeout.as_secs(),
            "Transcription providers configured"
        );

        TranscriptionDispatcher::new(remote, Self::create_local(model), timeout)
    }
}
