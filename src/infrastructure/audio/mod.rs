mod audio_decoder;
mod candle_whisper_model;
mod local_whisper_provider;
mod openai_whisper_provider;
mod provider_factory;

pub use audio_decoder::{MediaAudioReader, TARGET_SAMPLE_RATE};
pub use candle_whisper_model::{CandleWhisperModel, DEFAULT_LOCAL_MODEL_ID};
pub use local_whisper_provider::LocalWhisperProvider;
pub use openai_whisper_provider::{
    OPENAI_DEFAULT_BASE_URL, OPENAI_DEFAULT_MODEL, OPENAI_MAX_UPLOAD_BYTES, OpenAiWhisperProvider,
};
pub use provider_factory::{PrimaryProvider, ProviderFactory, RemoteProviderConfig};
