//! Bot API wire types.
//!
//! Only the fields the relay reads are modelled; everything else in the payloads is
//! ignored by serde.

use crate::traits::{BackendError, Identity, SentMedia};
use serde::Deserialize;

/// Envelope every Bot API method returns.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope, turning `ok: false` into [`BackendError::Api`].
    ///
    /// `http_status` is used as the error code when the body does not carry one.
    pub fn into_result(self, http_status: u16) -> Result<T, BackendError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(BackendError::InvalidResponse(
                "response is ok but carries no result".to_string(),
            )),
            (false, _) => Err(BackendError::Api {
                code: self.error_code.unwrap_or(i64::from(http_status)),
                description: self
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Identity {
            id: user.id,
            is_bot: user.is_bot,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Chat {
    /// Human-readable name: group title, else the person's name, else the username.
    pub fn display_name(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            return title.to_string();
        }

        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full_name.is_empty() {
            return full_name;
        }

        match &self.username {
            Some(username) => format!("@{}", username),
            None => self.id.to_string(),
        }
    }
}

/// A stored file as embedded in a message (video, document, animation, audio).
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub file_id: String,
    pub file_unique_id: String,
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Option<Chat>,
    pub video: Option<FileObject>,
    pub document: Option<FileObject>,
    pub animation: Option<FileObject>,
    pub audio: Option<FileObject>,
}

impl Message {
    /// Media stored by the send, in the order the Bot API may re-classify an upload.
    pub fn media(&self) -> Option<&FileObject> {
        self.video
            .as_ref()
            .or(self.animation.as_ref())
            .or(self.document.as_ref())
            .or(self.audio.as_ref())
    }

    /// Convert a send response into [`SentMedia`], using `fallback_size` when the
    /// API omits `file_size`.
    pub fn into_sent_media(self, fallback_size: u64) -> Result<SentMedia, BackendError> {
        let message_id = self.message_id;
        let media = self.media().ok_or_else(|| {
            BackendError::InvalidResponse(format!(
                "message {} carries no video, document, animation or audio",
                message_id
            ))
        })?;

        Ok(SentMedia {
            message_id,
            file_id: media.file_id.clone(),
            file_unique_id: media.file_unique_id.clone(),
            size_bytes: media.file_size.unwrap_or(fallback_size),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
    pub channel_post: Option<Message>,
    pub edited_channel_post: Option<Message>,
    pub my_chat_member: Option<ChatMemberUpdated>,
}

impl Update {
    /// Every chat this update mentions.
    pub fn chats(&self) -> impl Iterator<Item = &Chat> {
        let from_messages = [
            &self.message,
            &self.edited_message,
            &self.channel_post,
            &self.edited_channel_post,
        ]
        .into_iter()
        .filter_map(|m| m.as_ref().and_then(|m| m.chat.as_ref()));

        from_messages.chain(self.my_chat_member.as_ref().map(|m| &m.chat))
    }
}
