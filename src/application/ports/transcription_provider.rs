use std::fmt;

use async_trait::async_trait;

use crate::domain::{LanguageHint, TranscriptResult, UploadedMedia};

/// A speech-recognition backend.
///
/// Implementations translate `LanguageHint::Auto` into "no hint" themselves
/// and must return segments already passed through `normalize_segments`.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn transcribe(
        &self,
        media: &UploadedMedia,
        language: &LanguageHint,
    ) -> Result<TranscriptResult, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    PayloadTooLarge,
    Timeout,
    Upstream,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::PayloadTooLarge => "payload_too_large",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::Upstream => "upstream",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::PayloadTooLarge, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Upstream, message)
    }
}
