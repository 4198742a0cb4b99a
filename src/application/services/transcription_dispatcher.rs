use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::ports::{ProviderError, TranscriptionProvider};
use crate::domain::{LanguageHint, TranscriptResult, UploadedMedia};

pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    TryingRemote,
    TryingLocal,
    Succeeded,
    Failed,
}

impl DispatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Idle => "IDLE",
            DispatchState::TryingRemote => "TRYING_REMOTE",
            DispatchState::TryingLocal => "TRYING_LOCAL",
            DispatchState::Succeeded => "SUCCEEDED",
            DispatchState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Runs the remote provider (when configured) with the local provider as
/// backstop, all under a single deadline.
pub struct TranscriptionDispatcher {
    remote: Option<Arc<dyn TranscriptionProvider>>,
    local: Arc<dyn TranscriptionProvider>,
    timeout: Duration,
}

impl TranscriptionDispatcher {
    pub fn new(
        remote: Option<Arc<dyn TranscriptionProvider>>,
        local: Arc<dyn TranscriptionProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            remote,
            local,
            timeout,
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Expiry of the deadline wins over any provider error. The in-flight
    /// provider future is dropped; blocking work it started is left to finish
    /// on its own and its result is discarded.
    pub async fn dispatch(
        &self,
        media: &UploadedMedia,
        language: &LanguageHint,
    ) -> Result<TranscriptResult, ProviderError> {
        let started = Instant::now();

        match tokio::time::timeout(self.timeout, self.run_chain(media, language)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    upload_id = %media.id,
                    budget_ms = self.timeout.as_millis() as u64,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Transcription dispatch timed out"
                );
                tracing::debug!(to = %DispatchState::Failed, "Dispatch state transition");
                Err(ProviderError::timeout(format!(
                    "transcription exceeded the {}s budget",
                    self.timeout.as_secs_f64()
                )))
            }
        }
    }

    async fn run_chain(
        &self,
        media: &UploadedMedia,
        language: &LanguageHint,
    ) -> Result<TranscriptResult, ProviderError> {
        let mut state = DispatchState::Idle;

        if let Some(remote) = &self.remote {
            state = transition(state, DispatchState::TryingRemote);
            match remote.transcribe(media, language).await {
                Ok(result) => {
                    transition(state, DispatchState::Succeeded);
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(
                        provider = remote.name(),
                        kind = %e.kind,
                        error = %e.message,
                        "Primary provider failed, falling back to local provider"
                    );
                }
            }
        }

        state = transition(state, DispatchState::TryingLocal);
        match self.local.transcribe(media, language).await {
            Ok(result) => {
                transition(state, DispatchState::Succeeded);
                Ok(result)
            }
            Err(e) => {
                tracing::error!(
                    provider = self.local.name(),
                    kind = %e.kind,
                    error = %e.message,
                    "Local provider failed"
                );
                transition(state, DispatchState::Failed);
                Err(e)
            }
        }
    }
}

fn transition(from: DispatchState, to: DispatchState) -> DispatchState {
    tracing::debug!(from = %from, to = %to, "Dispatch state transition");
    to
}
