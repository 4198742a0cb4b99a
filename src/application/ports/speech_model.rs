use std::path::Path;

/// A locally resident recognition model.
///
/// Loaded once at startup and shared by reference; implementations must be
/// safe to call from several requests at once and keep no per-call state
/// between invocations. Calls block the current thread.
pub trait SpeechModel: Send + Sync {
    fn model_id(&self) -> &str;

    fn transcribe_file(
        &self,
        path: &Path,
        language: Option<&str>,
    ) -> Result<LocalTranscript, SpeechModelError>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalTranscript {
    pub text: String,
    /// Language the model detected, or the requested one when it ran with a
    /// hint and no detection. `None` when neither is known.
    pub language: Option<String>,
    pub spans: Vec<TimedSpan>,
}

/// A decoded span, addressed by start offset and duration in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSpan {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechModelError {
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}
