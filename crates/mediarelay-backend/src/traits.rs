//! Messaging backend abstraction
//!
//! This module defines the MessagingBackend trait that every backend must implement,
//! and the progress callback the transfer reports through.

use async_trait::async_trait;
use bytes::Bytes;
use mediarelay_core::models::{DialogEntry, Destination};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Backend operation errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not find, or refused access to, the requested entity.
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Backend API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BackendError {
    /// Request URLs embed the bot token, so they are stripped before the error travels.
    fn from(err: reqwest::Error) -> Self {
        BackendError::Http(err.without_url())
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Receives incremental byte counts while a file is being sent.
///
/// Called synchronously from the transfer; implementations must not block on I/O.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, bytes_sent: u64, total_bytes: u64);
}

/// A destination the backend has confirmed it can deliver to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub chat_id: i64,
    pub display_name: Option<String>,
}

/// Everything the backend needs to deliver one file.
#[derive(Debug, Clone)]
pub struct SendFileRequest {
    pub entity: ResolvedEntity,
    /// Readable local file; the backend never deletes it.
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub caption: String,
    /// Ask the backend to deliver in a streaming-friendly form (video messages).
    pub supports_streaming: bool,
    /// JPEG preview shown until the media is loaded.
    pub preview: Option<Bytes>,
}

/// What the backend reports back after a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMedia {
    pub message_id: i64,
    pub file_id: String,
    /// Stable identifier of the stored file, returned to callers as the access hash.
    pub file_unique_id: String,
    pub size_bytes: u64,
}

/// The account the backend is authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User(id={}, is_bot={}, first_name='{}'",
            self.id, self.is_bot, self.first_name
        )?;
        if let Some(last_name) = &self.last_name {
            write!(f, ", last_name='{}'", last_name)?;
        }
        if let Some(username) = &self.username {
            write!(f, ", username='{}'", username)?;
        }
        write!(f, ")")
    }
}

/// Messaging backend abstraction trait
///
/// The relay only ever needs these four capabilities. A backend is shared by all
/// requests behind an `Arc`; callers decide how transfers are serialized.
#[async_trait]
pub trait MessagingBackend: Send + Sync {
    /// Turn a parsed destination into an entity the backend can deliver to.
    ///
    /// Fails with [`BackendError::EntityNotFound`] when the backend does not know
    /// the destination or is not allowed to post there.
    async fn resolve_entity(&self, destination: &Destination) -> BackendResult<ResolvedEntity>;

    /// Send a local file, reporting progress to `progress` as bytes leave.
    async fn send_file_with_progress(
        &self,
        request: SendFileRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> BackendResult<SentMedia>;

    /// Identity of the authenticated account
    async fn get_me(&self) -> BackendResult<Identity>;

    /// Conversations the account can reach
    async fn list_dialogs(&self) -> BackendResult<Vec<DialogEntry>>;
}
