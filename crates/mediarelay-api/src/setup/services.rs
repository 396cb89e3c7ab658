//! Service wiring

use crate::services::upload::{MediaUploadService, Stager};
use crate::state::AppState;
use anyhow::{Context, Result};
use mediarelay_backend::MessagingBackend;
use mediarelay_core::Config;
use mediarelay_processing::PreviewGenerator;
use std::sync::Arc;
use std::time::Duration;

/// Build the application state around an already-created backend.
pub async fn initialize_services(
    config: &Config,
    backend: Arc<dyn MessagingBackend>,
) -> Result<Arc<AppState>> {
    tokio::fs::create_dir_all(config.staging_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create staging directory {}",
                config.staging_dir().display()
            )
        })?;

    let previews = if config.preview_enabled() {
        Some(
            PreviewGenerator::new(
                config.ffmpeg_path().to_string(),
                config.ffprobe_path().to_string(),
                Duration::from_secs(config.preview_timeout_secs()),
            )
            .context("Failed to initialize preview generator")?,
        )
    } else {
        tracing::info!("Preview generation disabled");
        None
    };

    let stager = Stager::new(
        config.staging_dir().clone(),
        config.upload_chunk_size_bytes(),
    );

    let upload_service = Arc::new(MediaUploadService::new(
        backend.clone(),
        stager,
        previews,
        config.backend_max_concurrent_transfers(),
    ));

    tracing::info!(
        staging_dir = %config.staging_dir().display(),
        chunk_size_bytes = config.upload_chunk_size_bytes(),
        max_concurrent_transfers = config.backend_max_concurrent_transfers(),
        "Upload service initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        backend,
        upload_service,
    }))
}
