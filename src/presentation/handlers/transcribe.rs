use std::io;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::application::services::{
    MediaLease, PipelineResponse, RequestPipeline, TranscriptionRequest,
};
use crate::domain::{LanguageHint, OutputFormat, TranscriptSegment, ValidationError};
use crate::presentation::state::AppState;

use super::error::ApiError;

#[derive(Serialize)]
pub struct SegmentResponse {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl From<&TranscriptSegment> for SegmentResponse {
    fn from(segment: &TranscriptSegment) -> Self {
        Self {
            id: segment.index,
            start: segment.start_seconds,
            end: segment.end_seconds,
            text: segment.text.clone(),
        }
    }
}

/// Text requests get the transcript; subtitle requests get only the rendered
/// document and its download name.
#[derive(Serialize)]
#[serde(untagged)]
pub enum TranscribeResponse {
    Text {
        text: String,
        language: String,
        segments: Vec<SegmentResponse>,
        original_filename: String,
    },
    Subtitles {
        filename: String,
        original_filename: String,
        srt: String,
    },
}

impl From<PipelineResponse> for TranscribeResponse {
    fn from(response: PipelineResponse) -> Self {
        let filename = response.subtitle_filename();
        match response.subtitles {
            Some(document) => Self::Subtitles {
                filename,
                original_filename: response.original_filename,
                srt: document.into_body(),
            },
            None => Self::Text {
                text: response.transcript.full_text,
                language: response.transcript.language_code,
                segments: response
                    .transcript
                    .segments
                    .iter()
                    .map(SegmentResponse::from)
                    .collect(),
                original_filename: response.original_filename,
            },
        }
    }
}

/// Multipart fields as they arrive. The file is streamed to scratch storage
/// as soon as its part is reached.
#[derive(Default)]
struct TranscribeForm {
    media: Option<MediaLease>,
    language: Option<String>,
    format: Option<String>,
}

impl TranscribeForm {
    async fn read(
        &mut self,
        pipeline: &RequestPipeline,
        multipart: &mut Multipart,
    ) -> Result<(), ApiError> {
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    if self.media.is_some() {
                        return Err(ValidationError::MalformedRequest(
                            "more than one file provided".to_string(),
                        )
                        .into());
                    }

                    let raw_filename = field.file_name().unwrap_or_default().to_string();
                    let stream = field
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
                        .boxed();

                    self.media = Some(pipeline.accept_upload(&raw_filename, stream).await?);
                }
                "language" => self.language = Some(field.text().await?),
                "format" => self.format = Some(field.text().await?),
                other => {
                    tracing::debug!(field = other, "Ignoring unknown multipart field");
                }
            }
        }

        Ok(())
    }

    fn into_request(self) -> Result<TranscriptionRequest, (ApiError, Option<MediaLease>)> {
        let output_format = match OutputFormat::parse(self.format.as_deref()) {
            Ok(format) => format,
            Err(e) => return Err((e.into(), self.media)),
        };

        let Some(media) = self.media else {
            return Err((ApiError::from(ValidationError::MissingFile), None));
        };

        Ok(TranscriptionRequest {
            media,
            language: LanguageHint::parse(self.language.as_deref()),
            output_format,
        })
    }
}

pub async fn transcribe_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let pipeline = state.pipeline.as_ref();

    let mut form = TranscribeForm::default();
    if let Err(e) = form.read(pipeline, &mut multipart).await {
        if let Some(media) = form.media.take() {
            pipeline.discard(media);
        }
        return Err(e);
    }

    let request = match form.into_request() {
        Ok(request) => request,
        Err((e, media)) => {
            if let Some(media) = media {
                pipeline.discard(media);
            }
            return Err(e);
        }
    };

    let response = pipeline.handle(request).await?;

    Ok(Json(TranscribeResponse::from(response)).into_response())
}
