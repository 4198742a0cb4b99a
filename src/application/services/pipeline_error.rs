use std::io;

use crate::application::ports::ProviderError;
use crate::domain::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("scratch directory unavailable: {0}")]
    ScratchDirectory(io::Error),
    #[error("failed to write upload to scratch storage: {0}")]
    ScratchWrite(io::Error),
}

/// The single error a request reports. Only the last failure in the provider
/// chain ends up here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("transcription failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    Resource(#[from] ResourceError),
    #[error("internal error: {0}")]
    Internal(String),
}
