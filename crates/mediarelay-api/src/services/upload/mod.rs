//! Upload pipeline: staging, preview, destination resolution, transfer.

pub mod progress;
pub mod service;
pub mod staging;
pub mod types;

pub use progress::{ProgressSnapshot, TransferTracker};
pub use service::MediaUploadService;
pub use staging::{StagedFile, Stager};
pub use types::{UploadRequest, UploadSource};
