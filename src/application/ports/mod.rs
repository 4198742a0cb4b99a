mod speech_model;
mod transcription_provider;

pub use speech_model::{LocalTranscript, SpeechModel, SpeechModelError, TimedSpan};
pub use transcription_provider::{ProviderError, ProviderErrorKind, TranscriptionProvider};
