//! Telegram Bot API backend
//!
//! Talks to `https://api.telegram.org` or a self-hosted Bot API server (required for
//! files above the public 50 MB limit). Files are streamed from disk as multipart
//! bodies; nothing is buffered whole in memory.

pub mod types;

use crate::stream::progress_stream;
use crate::traits::{
    BackendError, BackendResult, Identity, MessagingBackend, ProgressSink, ResolvedEntity,
    SendFileRequest, SentMedia,
};
use async_trait::async_trait;
use mediarelay_core::constants::is_video_file_name;
use mediarelay_core::models::{DialogEntry, Destination};
use mediarelay_core::Config;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use types::{ApiResponse, Chat, Message, Update, User};

/// Timeout for every call that does not carry a file.
const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Most recent updates inspected when listing dialogs.
const UPDATES_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: String,
    /// Chat that `me` resolves to; bots have no "Saved Messages" of their own.
    pub self_chat_id: Option<i64>,
    pub upload_timeout: Duration,
}

impl TelegramConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bot_token: config.telegram_bot_token().to_string(),
            api_url: config.telegram_api_url().to_string(),
            self_chat_id: config.telegram_self_chat_id(),
            upload_timeout: Duration::from_secs(config.backend_timeout_secs()),
        }
    }
}

#[derive(Clone)]
pub struct TelegramBotBackend {
    client: Client,
    base_url: String,
    self_chat_id: Option<i64>,
    upload_timeout: Duration,
}

impl std::fmt::Debug for TelegramBotBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBotBackend")
            .field("self_chat_id", &self.self_chat_id)
            .field("upload_timeout", &self.upload_timeout)
            .finish_non_exhaustive()
    }
}

impl TelegramBotBackend {
    pub fn new(config: TelegramConfig) -> BackendResult<Self> {
        if config.bot_token.trim().is_empty() {
            return Err(BackendError::Config("bot token is empty".to_string()));
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            self_chat_id: config.self_chat_id,
            upload_timeout: config.upload_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Send a prepared request and unwrap the Bot API envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> BackendResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let envelope: ApiResponse<T> = serde_json::from_slice(&body).map_err(|e| {
            BackendError::InvalidResponse(format!(
                "{} returned HTTP {} with an unreadable body: {}",
                method, status, e
            ))
        })?;

        envelope.into_result(status.as_u16())
    }

    async fn get_chat(&self, chat_id: i64) -> BackendResult<Chat> {
        let request = self
            .client
            .get(self.method_url("getChat"))
            .query(&[("chat_id", chat_id)])
            .timeout(METADATA_TIMEOUT);
        self.execute("getChat", request).await
    }

    fn build_form(request: SendFileRequest, file_part: Part) -> BackendResult<(Form, &'static str)> {
        let is_video = is_video_file_name(&request.file_name);
        let (method, field) = if is_video {
            ("sendVideo", "video")
        } else {
            ("sendDocument", "document")
        };

        let mut form = Form::new()
            .text("chat_id", request.entity.chat_id.to_string())
            .text("caption", request.caption)
            .part(field, file_part);

        if is_video && request.supports_streaming {
            form = form.text("supports_streaming", "true");
        }

        if let Some(preview) = request.preview {
            let thumbnail = Part::bytes(preview.to_vec())
                .file_name("thumbnail.jpg")
                .mime_str("image/jpeg")?;
            form = form.part("thumbnail", thumbnail);
        }

        Ok((form, method))
    }
}

/// Content type sent with the file part.
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl MessagingBackend for TelegramBotBackend {
    async fn resolve_entity(&self, destination: &Destination) -> BackendResult<ResolvedEntity> {
        let chat_id = match destination {
            Destination::SelfChat => self.self_chat_id.ok_or_else(|| {
                BackendError::EntityNotFound(
                    "no self chat is configured (set TELEGRAM_SELF_CHAT_ID)".to_string(),
                )
            })?,
            Destination::NumericId(id) => *id,
        };

        match self.get_chat(chat_id).await {
            Ok(chat) => {
                tracing::debug!(chat_id = chat.id, name = %chat.display_name(), "Resolved chat");
                Ok(ResolvedEntity {
                    chat_id: chat.id,
                    display_name: Some(chat.display_name()),
                })
            }
            // 400 "chat not found" and 403 "bot is not a member" both mean unreachable.
            Err(BackendError::Api {
                code: 400 | 403,
                description,
            }) => Err(BackendError::EntityNotFound(description)),
            Err(e) => Err(e),
        }
    }

    async fn send_file_with_progress(
        &self,
        request: SendFileRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> BackendResult<SentMedia> {
        let file = tokio::fs::File::open(&request.path).await?;
        let size_bytes = request.size_bytes;
        let chat_id = request.entity.chat_id;

        let body = Body::wrap_stream(progress_stream(file, size_bytes, progress));
        let file_part = Part::stream_with_length(body, size_bytes)
            .file_name(request.file_name.clone())
            .mime_str(mime_for_file_name(&request.file_name))?;

        let (form, method) = Self::build_form(request, file_part)?;

        tracing::debug!(method, chat_id, size_bytes, "Sending file to Telegram");
        let start = Instant::now();

        let http_request = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .timeout(self.upload_timeout);
        let message: Message = self.execute(method, http_request).await?;

        tracing::debug!(
            method,
            chat_id,
            message_id = message.message_id,
            duration_ms = start.elapsed().as_millis(),
            "Telegram accepted file"
        );

        message.into_sent_media(size_bytes)
    }

    async fn get_me(&self) -> BackendResult<Identity> {
        let request = self
            .client
            .get(self.method_url("getMe"))
            .timeout(METADATA_TIMEOUT);
        let user: User = self.execute("getMe", request).await?;
        Ok(user.into())
    }

    async fn list_dialogs(&self) -> BackendResult<Vec<DialogEntry>> {
        let request = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[("limit", UPDATES_LIMIT), ("timeout", 0)])
            .timeout(METADATA_TIMEOUT);
        let updates: Vec<Update> = self.execute("getUpdates", request).await?;

        let mut seen = HashSet::new();
        let mut dialogs = Vec::new();

        if let Some(self_chat_id) = self.self_chat_id {
            let name = match self.get_chat(self_chat_id).await {
                Ok(chat) => chat.display_name(),
                Err(e) => {
                    tracing::warn!(chat_id = self_chat_id, error = %e, "Could not look up self chat");
                    "me".to_string()
                }
            };
            seen.insert(self_chat_id);
            dialogs.push(DialogEntry {
                name,
                id: self_chat_id,
            });
        }

        // Newest first, matching the order a client shows conversations in.
        for update in updates.iter().rev() {
            for chat in update.chats() {
                if seen.insert(chat.id) {
                    dialogs.push(DialogEntry {
                        name: chat.display_name(),
                        id: chat.id,
                    });
                }
            }
        }

        Ok(dialogs)
    }
}
