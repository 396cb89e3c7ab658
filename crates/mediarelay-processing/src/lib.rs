//! Mediarelay Media Processing Library
//!
//! Probing and preview generation for video uploads. Everything here is best-effort
//! from the caller's point of view: failures surface as `None`, never as errors.

pub mod metadata;
pub mod video;

// Re-export commonly used types
pub use metadata::VideoMetadata;
pub use video::{preview_dimensions, PreviewGenerator, VideoProcessor};
