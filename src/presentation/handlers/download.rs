use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::domain::sanitize_filename;

const DEFAULT_SUBTITLE_FILENAME: &str = "transcription.srt";

#[derive(Deserialize)]
pub struct DownloadSubtitleRequest {
    #[serde(default)]
    pub srt: String,
    #[serde(default)]
    pub filename: Option<String>,
}

pub async fn download_srt_handler(Json(request): Json<DownloadSubtitleRequest>) -> Response {
    let filename = attachment_filename(request.filename.as_deref());

    tracing::debug!(filename = %filename, bytes = request.srt.len(), "Serving subtitle download");

    let disposition = content_disposition(&filename);
    let mut response = (StatusCode::OK, request.srt).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    response
}

/// Sanitized download name, always ending in `.srt`.
pub fn attachment_filename(requested: Option<&str>) -> String {
    let requested = requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_SUBTITLE_FILENAME);

    let sanitized = sanitize_filename(requested);
    if sanitized.to_lowercase().ends_with(".srt") {
        sanitized
    } else {
        format!("{}.srt", sanitized)
    }
}

/// `attachment` disposition with an ASCII fallback name plus the RFC 5987
/// encoded original.
pub fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(filename)
    )
}
