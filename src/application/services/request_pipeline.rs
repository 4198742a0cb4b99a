use std::any::Any;
use std::io;
use std::panic::AssertUnwindSafe;

use bytes::Bytes;
use futures::FutureExt;
use futures::stream::BoxStream;

use crate::domain::{
    AllowedExtensions, LanguageHint, MediaFilename, OutputFormat, SubtitleDocument,
    TranscriptResult, UploadedMedia, subtitle_filename,
};

use super::{MediaLease, PipelineError, TranscriptionDispatcher, UploadLifecycle};

pub struct TranscriptionRequest {
    pub media: MediaLease,
    pub language: LanguageHint,
    pub output_format: OutputFormat,
}

/// `subtitles` is only rendered when the request asked for subtitle output.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResponse {
    pub original_filename: String,
    pub sanitized_filename: String,
    pub transcript: TranscriptResult,
    pub subtitles: Option<SubtitleDocument>,
}

impl PipelineResponse {
    pub fn subtitle_filename(&self) -> String {
        subtitle_filename(&self.sanitized_filename)
    }
}

/// Top-level coordinator for one transcription request.
pub struct RequestPipeline {
    allowed_extensions: AllowedExtensions,
    uploads: UploadLifecycle,
    dispatcher: TranscriptionDispatcher,
}

impl RequestPipeline {
    pub fn new(
        allowed_extensions: AllowedExtensions,
        uploads: UploadLifecycle,
        dispatcher: TranscriptionDispatcher,
    ) -> Self {
        Self {
            allowed_extensions,
            uploads,
            dispatcher,
        }
    }

    pub fn allowed_extensions(&self) -> &AllowedExtensions {
        &self.allowed_extensions
    }

    pub fn dispatcher(&self) -> &TranscriptionDispatcher {
        &self.dispatcher
    }

    /// Checks the filename against the allow-list, then streams the body into
    /// scratch storage. Nothing is written for a rejected name.
    pub async fn accept_upload(
        &self,
        raw_filename: &str,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<MediaLease, PipelineError> {
        let filename = MediaFilename::parse(raw_filename, &self.allowed_extensions)?;
        self.uploads.acquire(filename, stream).await
    }

    /// Dispatches, renders when asked to, and always releases the upload
    /// before returning.
    #[tracing::instrument(
        skip(self, request),
        fields(
            upload_id = %request.media.media().id,
            filename = %request.media.media().sanitized_filename,
            language = %request.language,
            format = %request.output_format,
        )
    )]
    pub async fn handle(
        &self,
        request: TranscriptionRequest,
    ) -> Result<PipelineResponse, PipelineError> {
        let TranscriptionRequest {
            media,
            language,
            output_format,
        } = request;

        let outcome = AssertUnwindSafe(self.transcribe(media.media(), &language, output_format))
            .catch_unwind()
            .await;

        let original_filename = media.media().raw_filename.clone();
        let sanitized_filename = media.media().sanitized_filename.clone();
        self.uploads.release(media);

        match outcome {
            Ok(Ok((transcript, subtitles))) => {
                tracing::info!(
                    segments = transcript.segments.len(),
                    language = %transcript.language_code,
                    "Transcription completed"
                );
                Ok(PipelineResponse {
                    original_filename,
                    sanitized_filename,
                    transcript,
                    subtitles,
                })
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Transcription failed");
                Err(e)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "Transcription panicked");
                Err(PipelineError::Internal(message))
            }
        }
    }

    /// Releases an upload whose request was abandoned before `handle`.
    pub fn discard(&self, media: MediaLease) {
        self.uploads.release(media);
    }

    /// Accepts the upload and handles it in one go, for callers that already
    /// know the language and output format.
    pub async fn run(
        &self,
        raw_filename: &str,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
        language: LanguageHint,
        output_format: OutputFormat,
    ) -> Result<PipelineResponse, PipelineError> {
        let media = self.accept_upload(raw_filename, stream).await?;
        self.handle(TranscriptionRequest {
            media,
            language,
            output_format,
        })
        .await
    }

    async fn transcribe(
        &self,
        media: &UploadedMedia,
        language: &LanguageHint,
        output_format: OutputFormat,
    ) -> Result<(TranscriptResult, Option<SubtitleDocument>), PipelineError> {
        tracing::info!(bytes = media.size_bytes, "Transcribing upload");

        let transcript = self.dispatcher.dispatch(media, language).await?;

        let subtitles = match output_format {
            OutputFormat::Text => None,
            OutputFormat::Subtitle => Some(SubtitleDocument::render(&transcript.segments)),
        };

        Ok((transcript, subtitles))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
