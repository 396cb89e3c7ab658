//! Constants shared across crates.

/// Extensions treated as video content (preview generation, streaming delivery).
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Destination token that addresses the authenticated account itself.
pub const SELF_DESTINATION: &str = "me";

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Returns true when `file_name` ends in one of [`VIDEO_EXTENSIONS`] (case-insensitive).
pub fn is_video_file_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Convert a byte count to megabytes rounded to two decimal places.
pub fn bytes_to_mb_rounded(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}
