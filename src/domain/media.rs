use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use super::{UploadId, ValidationError, sanitize_filename};

const DEFAULT_EXTENSIONS: [&str; 11] = [
    "mp3", "wav", "mp4", "avi", "mov", "mkv", "flv", "webm", "m4a", "aac", "ogg",
];

/// Lower-cased file extension without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaExtension(String);

impl MediaExtension {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().trim_start_matches('.').to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn content_type(&self) -> &'static str {
        match self.0.as_str() {
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "m4a" => "audio/mp4",
            "aac" => "audio/aac",
            "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            "mp4" => "video/mp4",
            "mov" => "video/quicktime",
            "avi" => "video/x-msvideo",
            "mkv" => "video/x-matroska",
            "flv" => "video/x-flv",
            "webm" => "video/webm",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Display for MediaExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Case-insensitive set of extensions accepted for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedExtensions(BTreeSet<String>);

impl AllowedExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            extensions
                .into_iter()
                .map(|ext| MediaExtension::new(ext.as_ref()).0)
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, extension: &MediaExtension) -> bool {
        self.0.contains(extension.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for AllowedExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// A client filename that passed the allow-list check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilename {
    pub raw: String,
    pub sanitized: String,
    pub extension: MediaExtension,
}

impl MediaFilename {
    pub fn parse(raw: &str, allowed: &AllowedExtensions) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::MissingFilename);
        }

        let sanitized = sanitize_filename(raw);
        let extension = match sanitized.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.trim().is_empty() => {
                MediaExtension::new(ext)
            }
            _ => return Err(ValidationError::MissingExtension),
        };

        if !allowed.contains(&extension) {
            return Err(ValidationError::UnsupportedExtension(
                extension.as_str().to_string(),
            ));
        }

        Ok(Self {
            raw: raw.to_string(),
            sanitized,
            extension,
        })
    }
}

/// An upload written to scratch storage for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub id: UploadId,
    pub raw_filename: String,
    pub sanitized_filename: String,
    pub extension: MediaExtension,
    pub size_bytes: u64,
    pub storage_path: PathBuf,
}
