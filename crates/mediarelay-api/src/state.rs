//! Application state shared by all handlers.

use crate::services::upload::MediaUploadService;
use mediarelay_backend::MessagingBackend;
use mediarelay_core::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Shared backend session, also used directly by the pass-through endpoints.
    pub backend: Arc<dyn MessagingBackend>,
    pub upload_service: Arc<MediaUploadService>,
}
