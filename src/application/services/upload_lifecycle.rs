use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::domain::{MediaFilename, UploadId, UploadedMedia, ValidationError};

use super::{PipelineError, ResourceError};

/// Scratch file backing one request's upload.
///
/// Hand it back to [`UploadLifecycle::release`] when the request is done. If
/// the lease is dropped instead (a cancelled handler, a panic while
/// unwinding) the file is still removed.
#[derive(Debug)]
pub struct MediaLease {
    media: UploadedMedia,
    path: TempPath,
}

impl MediaLease {
    pub fn media(&self) -> &UploadedMedia {
        &self.media
    }
}

/// Owns the scratch directory shared by concurrent requests. Every upload gets
/// its own uniquely named file, so requests never contend.
#[derive(Debug, Clone)]
pub struct UploadLifecycle {
    scratch_dir: PathBuf,
}

impl UploadLifecycle {
    pub fn new(scratch_dir: PathBuf) -> Result<Self, ResourceError> {
        std::fs::create_dir_all(&scratch_dir).map_err(ResourceError::ScratchDirectory)?;
        Ok(Self { scratch_dir })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub async fn acquire(
        &self,
        filename: MediaFilename,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<MediaLease, PipelineError> {
        let id = UploadId::new();
        let temp = tempfile::Builder::new()
            .prefix(&format!("{id}-"))
            .suffix(&format!(".{}", filename.extension))
            .tempfile_in(&self.scratch_dir)
            .map_err(ResourceError::ScratchWrite)?;

        let mut file = tokio::fs::File::from_std(temp.reopen().map_err(ResourceError::ScratchWrite)?);
        let path = temp.into_temp_path();

        let mut size_bytes: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| ValidationError::MalformedRequest(e.to_string()))?;
            file.write_all(&bytes)
                .await
                .map_err(ResourceError::ScratchWrite)?;
            size_bytes += bytes.len() as u64;
        }
        file.flush().await.map_err(ResourceError::ScratchWrite)?;
        drop(file);

        if size_bytes == 0 {
            tracing::warn!(filename = %filename.sanitized, "Rejecting empty upload");
            discard(path, &filename.sanitized);
            return Err(ValidationError::EmptyUpload.into());
        }

        tracing::debug!(
            upload_id = %id,
            filename = %filename.sanitized,
            bytes = size_bytes,
            path = %path.display(),
            "Upload written to scratch storage"
        );

        let media = UploadedMedia {
            id,
            raw_filename: filename.raw,
            sanitized_filename: filename.sanitized,
            extension: filename.extension,
            size_bytes,
            storage_path: path.to_path_buf(),
        };

        Ok(MediaLease { media, path })
    }

    /// Deletes the scratch file. Failures are logged and never propagated.
    pub fn release(&self, lease: MediaLease) {
        let MediaLease { media, path } = lease;
        match path.close() {
            Ok(()) => tracing::debug!(upload_id = %media.id, "Scratch file released"),
            Err(e) => tracing::warn!(
                upload_id = %media.id,
                path = %media.storage_path.display(),
                error = %e,
                "Failed to delete scratch file"
            ),
        }
    }
}

fn discard(path: TempPath, filename: &str) {
    if let Err(e) = path.close() {
        tracing::warn!(filename = %filename, error = %e, "Failed to delete rejected upload");
    }
}
