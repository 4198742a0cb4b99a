mod download;
mod error;
mod health;
mod transcribe;

pub use download::{attachment_filename, content_disposition, download_srt_handler};
pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use transcribe::transcribe_handler;
