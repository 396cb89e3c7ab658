//! Video processor - metadata extraction via ffprobe

use crate::metadata::VideoMetadata;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tokio::process::Command;

/// Validate that an executable path doesn't contain shell metacharacters or traversal.
pub(crate) fn validate_executable_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() {
        return Err(anyhow!("Executable path is empty"));
    }
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }
    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }
    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\')
    {
        return Err(anyhow!("Path contains unsafe characters: {}", path));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct VideoProcessor {
    ffprobe_path: String,
}

impl VideoProcessor {
    pub fn new(ffprobe_path: String) -> Result<Self> {
        validate_executable_path(&ffprobe_path).context("Invalid ffprobe_path")?;
        Ok(Self { ffprobe_path })
    }

    /// Probe the first video stream of the file at `video_path`.
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn extract_metadata_from_path(&self, video_path: &Path) -> Result<VideoMetadata> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(video_path)
            .kill_on_drop(true)
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let metadata = parse_probe_output(&output.stdout)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = ?metadata.duration,
            width = metadata.width,
            height = metadata.height,
            codec = %metadata.codec,
            "Video probe completed"
        );

        Ok(metadata)
    }
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
pub fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata> {
    let probe_data: serde_json::Value =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe output")?;

    let stream = probe_data["streams"]
        .as_array()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s["codec_type"].as_str().map_or(true, |t| t == "video"))
        })
        .ok_or_else(|| anyhow!("No video stream found"))?;

    let format = &probe_data["format"];

    let duration = format["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok());

    let width = stream["width"]
        .as_u64()
        .filter(|w| *w > 0)
        .ok_or_else(|| anyhow!("Could not parse width"))? as u32;

    let height = stream["height"]
        .as_u64()
        .filter(|h| *h > 0)
        .ok_or_else(|| anyhow!("Could not parse height"))? as u32;

    let codec = stream["codec_name"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();

    let bitrate = format["bit_rate"]
        .as_str()
        .and_then(|b| b.parse::<u64>().ok());

    let framerate = stream["r_frame_rate"].as_str().and_then(|r| {
        let (num, den) = r.split_once('/')?;
        let num: f32 = num.parse().ok()?;
        let den: f32 = den.parse().ok()?;
        if den != 0.0 {
            Some(num / den)
        } else {
            None
        }
    });

    Ok(VideoMetadata {
        duration,
        width,
        height,
        codec,
        bitrate,
        framerate,
    })
}
