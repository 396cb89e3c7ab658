//! Staging: materialize an upload source as a local file.
//!
//! Inbound bytes land in a temp file under the staging directory that is deleted
//! on [`StagedFile::release`] or, failing that, when the [`StagedFile`] is dropped
//! (client disconnects, panics). Caller-supplied paths are used in place and never
//! deleted.

use crate::constants::{MAX_STAGED_EXTENSION_BYTES, MAX_STAGED_NAME_BYTES, STAGED_FILE_PREFIX};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use mediarelay_core::StagingError;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::{AsyncWriteExt, BufWriter};

use super::types::UploadSource;

/// A file ready to be sent.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    file_name: String,
    size_bytes: u64,
    /// Present only for files the relay created; deleting it removes the file.
    temp: Option<TempPath>,
}

impl StagedFile {
    /// Wrap a caller-owned file; it will never be deleted.
    pub fn borrowed(path: PathBuf, file_name: String, size_bytes: u64) -> Self {
        Self {
            path,
            file_name,
            size_bytes,
            temp: None,
        }
    }

    fn owned(temp: TempPath, file_name: String, size_bytes: u64) -> Self {
        Self {
            path: temp.to_path_buf(),
            file_name,
            size_bytes,
            temp: Some(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn is_owned(&self) -> bool {
        self.temp.is_some()
    }

    /// Delete the file if the relay owns it. Borrowed files are left untouched.
    pub fn release(self) -> io::Result<()> {
        match self.temp {
            Some(temp) => {
                tracing::debug!(path = %self.path.display(), "Removing staged file");
                temp.close()
            }
            None => Ok(()),
        }
    }
}

/// Reduce a client-supplied name to something safe inside a temp-file name.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);

    let sanitized: String = base
        .replace("..", "_")
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "file".to_string()
    } else {
        truncate_keeping_extension(&sanitized, MAX_STAGED_NAME_BYTES)
    }
}

/// Shorten `name` to at most `max_bytes` on a char boundary, keeping a short
/// extension intact. Multi-byte names (CJK, emoji) are measured in bytes.
fn truncate_keeping_extension(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(idx) if idx > 0 && name.len() - idx <= MAX_STAGED_EXTENSION_BYTES => {
            name.split_at(idx)
        }
        _ => (name, ""),
    };

    let budget = max_bytes.saturating_sub(extension.len());
    let end = stem
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .take_while(|end| *end <= budget)
        .last()
        .unwrap_or(0);

    format!("{}{}", &stem[..end], extension)
}

/// Writes inbound uploads into the staging directory.
#[derive(Debug, Clone)]
pub struct Stager {
    staging_dir: PathBuf,
    write_buffer_bytes: usize,
}

impl Stager {
    pub fn new(staging_dir: PathBuf, write_buffer_bytes: usize) -> Self {
        Self {
            staging_dir,
            write_buffer_bytes: write_buffer_bytes.max(1),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Materialize `source` as a [`StagedFile`] named `file_name`.
    pub async fn stage(
        &self,
        source: UploadSource,
        file_name: &str,
    ) -> Result<StagedFile, StagingError> {
        match source {
            UploadSource::Staged(staged) => Ok(staged),
            UploadSource::LocalPath(path) => self.stage_local_path(path, file_name).await,
            UploadSource::InlineBytes(bytes) => {
                self.stage_stream(file_name, futures::stream::iter([Ok(bytes)]))
                    .await
            }
        }
    }

    /// Check a caller-supplied path; nothing is copied.
    pub async fn stage_local_path(
        &self,
        path: PathBuf,
        file_name: &str,
    ) -> Result<StagedFile, StagingError> {
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StagingError::NotFound(path))
            }
            Err(e) => return Err(StagingError::Io(e)),
        };

        if !metadata.is_file() {
            return Err(StagingError::NotAFile(path));
        }

        Ok(StagedFile::borrowed(
            path,
            file_name.to_string(),
            metadata.len(),
        ))
    }

    /// Stream bytes into a new temp file. Memory stays bounded by the write buffer:
    /// chunks larger than the buffer are written in buffer-sized pieces.
    pub async fn stage_stream<S>(
        &self,
        file_name: &str,
        stream: S,
    ) -> Result<StagedFile, StagingError>
    where
        S: Stream<Item = io::Result<Bytes>>,
    {
        let suffix = format!("_{}", sanitize_file_name(file_name));
        let temp_file = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.staging_dir)?;
        let (file, temp_path) = temp_file.into_parts();

        // Dropping `temp_path` on any early return deletes the partial file.
        let mut writer =
            BufWriter::with_capacity(self.write_buffer_bytes, tokio::fs::File::from_std(file));
        let mut size_bytes: u64 = 0;

        futures::pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for piece in chunk.chunks(self.write_buffer_bytes) {
                writer.write_all(piece).await?;
            }
            size_bytes += chunk.len() as u64;
        }
        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        tracing::debug!(
            path = %temp_path.display(),
            file_name = %file_name,
            size_bytes,
            "Staged upload to disk"
        );

        Ok(StagedFile::owned(temp_path, file_name.to_string(), size_bytes))
    }
}
