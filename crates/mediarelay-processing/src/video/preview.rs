//! Preview generation: a small JPEG still for video uploads.
//!
//! The backend shows the preview in place of the video until the client starts
//! streaming, so it only needs to be small and recognisable. Any failure yields
//! `None` and the upload continues without one.

use crate::video::processor::{validate_executable_path, VideoProcessor};
use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use mediarelay_core::constants::is_video_file_name;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Length of the longer preview side in pixels.
pub const PREVIEW_LONG_SIDE: u32 = 320;

/// Seek offset for the extracted frame; skips black or blank leading frames.
pub const PREVIEW_FRAME_OFFSET_SECS: f64 = 0.1;

pub const PREVIEW_JPEG_QUALITY: u8 = 85;

/// Scale `(width, height)` so the longer side becomes [`PREVIEW_LONG_SIDE`],
/// flooring the shorter side. Returns `None` for zero-sized input.
pub fn preview_dimensions(width: u32, height: u32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }

    let long = u64::from(PREVIEW_LONG_SIDE);
    let dims = if width > height {
        let scaled = (u64::from(height) * long / u64::from(width)).max(1) as u32;
        (PREVIEW_LONG_SIDE, scaled)
    } else {
        let scaled = (u64::from(width) * long / u64::from(height)).max(1) as u32;
        (scaled, PREVIEW_LONG_SIDE)
    };
    Some(dims)
}

/// Re-encode a decoded frame (any format `image` understands) as JPEG.
pub fn encode_jpeg(frame: &[u8], quality: u8) -> Result<Bytes> {
    let decoded = image::load_from_memory(frame).context("Failed to decode extracted frame")?;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .context("Failed to encode preview as JPEG")?;

    Ok(Bytes::from(buffer))
}

#[derive(Debug, Clone)]
pub struct PreviewGenerator {
    processor: VideoProcessor,
    ffmpeg_path: String,
    timeout: Duration,
}

impl PreviewGenerator {
    pub fn new(ffmpeg_path: String, ffprobe_path: String, timeout: Duration) -> Result<Self> {
        validate_executable_path(&ffmpeg_path).context("Invalid ffmpeg_path")?;
        let processor = VideoProcessor::new(ffprobe_path)?;

        Ok(Self {
            processor,
            ffmpeg_path,
            timeout,
        })
    }

    /// Produce a JPEG preview for a video file, or `None` when the name is not a
    /// video, probing fails, there is no video stream, or decode/encode fails.
    pub async fn generate_preview(&self, path: &Path, file_name: &str) -> Option<Bytes> {
        if !is_video_file_name(file_name) {
            return None;
        }

        match tokio::time::timeout(self.timeout, self.try_generate(path)).await {
            Ok(Ok(preview)) => {
                tracing::debug!(
                    file_name = %file_name,
                    preview_bytes = preview.len(),
                    "Preview generated"
                );
                Some(preview)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    file_name = %file_name,
                    path = %path.display(),
                    error = %e,
                    "Preview generation failed, uploading without preview"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    file_name = %file_name,
                    timeout_secs = self.timeout.as_secs(),
                    "Preview generation timed out, uploading without preview"
                );
                None
            }
        }
    }

    async fn try_generate(&self, path: &Path) -> Result<Bytes> {
        let metadata = self.processor.extract_metadata_from_path(path).await?;
        let (width, height) = preview_dimensions(metadata.width, metadata.height)
            .ok_or_else(|| anyhow!("Video stream reports zero dimensions"))?;

        let frame = self.extract_frame(path, width, height).await?;

        tokio::task::spawn_blocking(move || encode_jpeg(&frame, PREVIEW_JPEG_QUALITY))
            .await
            .map_err(|e| anyhow!("Preview encoding task failed: {}", e))?
    }

    /// Extract one scaled frame as PNG through ffmpeg's stdout.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "extract_frame"
    ))]
    async fn extract_frame(&self, input_path: &Path, width: u32, height: u32) -> Result<Vec<u8>> {
        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            PREVIEW_FRAME_OFFSET_SECS.to_string(),
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-vf".to_string(),
            format!("scale={}:{}", width, height),
            "-vframes".to_string(),
            "1".to_string(),
            "-f".to_string(),
            "image2pipe".to_string(),
            "-vcodec".to_string(),
            "png".to_string(),
            "pipe:1".to_string(),
        ];

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("FFmpeg frame extraction failed: {}", stderr));
        }

        if output.stdout.is_empty() {
            return Err(anyhow!("FFmpeg produced no frame"));
        }

        Ok(output.stdout)
    }
}
