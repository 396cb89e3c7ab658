//! Types used by the media upload service

use super::staging::StagedFile;
use bytes::Bytes;
use std::path::PathBuf;

/// Where the bytes of an upload come from.
#[derive(Debug)]
pub enum UploadSource {
    /// Whole body already in memory.
    InlineBytes(Bytes),
    /// A file on the relay's filesystem, named by the caller.
    LocalPath(PathBuf),
    /// Streamed to disk while the multipart body was read.
    Staged(StagedFile),
}

/// One upload call, immutable once built.
#[derive(Debug)]
pub struct UploadRequest {
    pub source: UploadSource,
    pub file_name: String,
    pub caption: Option<String>,
    /// Destination token as supplied by the caller (`me` or a numeric chat id).
    pub destination: String,
}

impl UploadRequest {
    /// Caption to send; an empty or missing caption falls back to the file name.
    pub fn effective_caption(&self) -> String {
        match self.caption.as_deref() {
            Some(caption) if !caption.is_empty() => caption.to_string(),
            _ => self.file_name.clone(),
        }
    }
}
