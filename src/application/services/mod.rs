mod pipeline_error;
mod request_pipeline;
mod segment_normalizer;
mod transcription_dispatcher;
mod upload_lifecycle;

pub use pipeline_error::{PipelineError, ResourceError};
pub use request_pipeline::{
    PipelineResponse, RequestPipeline, TranscriptionRequest,
};
pub use segment_normalizer::{SegmentSource, normalize_segments};
pub use transcription_dispatcher::{DEFAULT_DISPATCH_TIMEOUT, DispatchState, TranscriptionDispatcher};
pub use upload_lifecycle::{MediaLease, UploadLifecycle};
