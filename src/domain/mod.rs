mod filename;
mod language;
mod media;
mod output_format;
mod subtitle;
mod transcript;
mod upload_id;
mod validation_error;

pub use filename::{MAX_FILENAME_BYTES, UNNAMED_PLACEHOLDER, sanitize_filename};
pub use language::{DEFAULT_LANGUAGE_CODE, LanguageHint, resolve_language_code};
pub use media::{AllowedExtensions, MediaExtension, MediaFilename, UploadedMedia};
pub use output_format::OutputFormat;
pub use subtitle::{SubtitleDocument, format_timestamp, subtitle_filename};
pub use transcript::{TranscriptResult, TranscriptSegment};
pub use upload_id::UploadId;
pub use validation_error::ValidationError;
