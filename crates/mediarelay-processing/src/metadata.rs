//! Media metadata types

use serde::{Deserialize, Serialize};

/// Video metadata as reported by ffprobe for the first video stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Container duration in seconds; some containers (live captures, broken muxes) omit it.
    pub duration: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub codec: String,
    pub bitrate: Option<u64>,
    pub framerate: Option<f32>,
}
