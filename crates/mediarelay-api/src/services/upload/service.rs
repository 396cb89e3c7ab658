//! Media upload service
//!
//! Runs one upload end to end: stage → parse destination → preview → resolve entity →
//! transfer → result. Every failure terminates the call; the staged file is released
//! on every path.

use std::sync::Arc;
use std::time::Instant;

use mediarelay_backend::{BackendError, MessagingBackend, SendFileRequest};
use mediarelay_core::constants::{bytes_to_mb_rounded, is_video_file_name};
use mediarelay_core::models::{Destination, UploadResult};
use mediarelay_core::UploadError;
use mediarelay_processing::PreviewGenerator;
use tokio::sync::Semaphore;

use super::progress::{format_mm_ss, TransferTracker};
use super::staging::{StagedFile, Stager};
use super::types::UploadRequest;

/// Upload orchestrator
///
/// The backend session is shared by every request; `transfer_permits` bounds how many
/// resolve-and-send sequences run against it at once.
pub struct MediaUploadService {
    backend: Arc<dyn MessagingBackend>,
    stager: Stager,
    previews: Option<PreviewGenerator>,
    transfer_permits: Semaphore,
}

impl MediaUploadService {
    pub fn new(
        backend: Arc<dyn MessagingBackend>,
        stager: Stager,
        previews: Option<PreviewGenerator>,
        max_concurrent_transfers: usize,
    ) -> Self {
        Self {
            backend,
            stager,
            previews,
            transfer_permits: Semaphore::new(max_concurrent_transfers.max(1)),
        }
    }

    pub fn stager(&self) -> &Stager {
        &self.stager
    }

    /// Upload one file. Success is all-or-nothing; no partial result is returned.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResult, UploadError> {
        let caption = request.effective_caption();
        let UploadRequest {
            source,
            file_name,
            destination,
            ..
        } = request;

        // 1. Stage
        let staged = self.stager.stage(source, &file_name).await?;

        let outcome = if staged.file_name().trim().is_empty() {
            Err(UploadError::EmptyFileName)
        } else {
            self.deliver(&staged, caption, &destination).await
        };

        // 7. Release whatever we own
        if let Err(e) = staged.release() {
            tracing::warn!(file_name = %file_name, error = %e, "Failed to remove staged file");
        }

        outcome
    }

    async fn deliver(
        &self,
        staged: &StagedFile,
        caption: String,
        token: &str,
    ) -> Result<UploadResult, UploadError> {
        let started = Instant::now();

        // 2. Destination token
        let destination = Destination::resolve(token)?;

        tracing::info!(
            file_name = %staged.file_name(),
            size_mb = bytes_to_mb_rounded(staged.size_bytes()),
            destination = %destination,
            "Starting upload"
        );

        // 3. Preview, best effort
        let is_video = is_video_file_name(staged.file_name());
        let preview = match &self.previews {
            Some(generator) if is_video => {
                generator
                    .generate_preview(staged.path(), staged.file_name())
                    .await
            }
            _ => None,
        };
        if is_video {
            tracing::info!(
                file_name = %staged.file_name(),
                has_preview = preview.is_some(),
                "Preview step finished"
            );
        }

        let _permit = self
            .transfer_permits
            .acquire()
            .await
            .map_err(|_| UploadError::Backend("transfer queue is closed".to_string()))?;

        let entity = self
            .backend
            .resolve_entity(&destination)
            .await
            .map_err(|e| backend_failure(token, e))?;

        // 4. Fresh clock right before the transfer
        let tracker = Arc::new(TransferTracker::new(staged.file_name()));
        tracker.reset();

        // 5. Transfer
        let send = SendFileRequest {
            entity,
            path: staged.path().to_path_buf(),
            file_name: staged.file_name().to_string(),
            size_bytes: staged.size_bytes(),
            caption,
            supports_streaming: true,
            preview,
        };
        let sent = self
            .backend
            .send_file_with_progress(send, tracker.clone())
            .await
            .map_err(|e| backend_failure(token, e))?;

        // 6. Result
        let result = UploadResult {
            file_id: sent.file_id,
            access_token: sent.file_unique_id,
            file_name: staged.file_name().to_string(),
            size_mb: bytes_to_mb_rounded(sent.size_bytes),
            message_id: sent.message_id,
            destination: token.to_string(),
        };

        tracing::info!(
            file_name = %result.file_name,
            message_id = result.message_id,
            size_mb = result.size_mb,
            elapsed = %format_mm_ss(started.elapsed().as_secs_f64()),
            "Upload completed"
        );

        Ok(result)
    }
}

/// Entity errors point at the caller's destination; everything else is a backend failure.
fn backend_failure(token: &str, err: BackendError) -> UploadError {
    match err {
        BackendError::EntityNotFound(reason) => UploadError::InvalidDestination {
            token: token.to_string(),
            reason,
        },
        other => {
            tracing::error!(error = %other, "Backend transfer failed");
            UploadError::Backend(other.to_string())
        }
    }
}
