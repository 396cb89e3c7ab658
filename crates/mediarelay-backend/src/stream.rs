//! Progress-reporting file streams for request bodies.

use crate::traits::ProgressSink;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::io;
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Read size for streamed uploads.
pub const READ_CHUNK_SIZE: usize = 512 * 1024;

/// Stream `file` in [`READ_CHUNK_SIZE`] chunks, reporting the running byte count
/// to `sink` after each chunk is handed to the transport.
///
/// An initial `(0, total)` report is made before the first chunk so trackers see
/// the transfer start even for empty files.
pub fn progress_stream(
    file: File,
    total_bytes: u64,
    sink: Arc<dyn ProgressSink>,
) -> impl Stream<Item = io::Result<Bytes>> + Send + Sync + 'static {
    sink.on_progress(0, total_bytes);

    let mut sent: u64 = 0;
    ReaderStream::with_capacity(file, READ_CHUNK_SIZE).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            sent += bytes.len() as u64;
            sink.on_progress(sent, total_bytes);
        }
        chunk
    })
}
