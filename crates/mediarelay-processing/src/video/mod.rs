//! Video processing module

pub mod preview;
pub mod processor;

pub use preview::{preview_dimensions, PreviewGenerator};
pub use processor::VideoProcessor;
