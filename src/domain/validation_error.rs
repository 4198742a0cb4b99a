#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No file provided")]
    MissingFile,
    #[error("No file selected")]
    MissingFilename,
    #[error("File has no extension")]
    MissingExtension,
    #[error("File type not supported: .{0}")]
    UnsupportedExtension(String),
    #[error("Output format not supported: {0}")]
    UnsupportedFormat(String),
    #[error("Uploaded file is empty")]
    EmptyUpload,
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}
