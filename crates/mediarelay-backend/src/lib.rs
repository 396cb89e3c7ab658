//! Mediarelay Backend Library
//!
//! This crate provides the messaging backend abstraction the upload pipeline talks to,
//! plus the Telegram Bot API implementation.
//!
//! The backend owns everything the relay does not: entity resolution, the chunked
//! transfer itself and its wire protocol. Callers hold an `Arc<dyn MessagingBackend>`
//! and receive transfer progress through a [`ProgressSink`].

pub mod factory;
pub mod stream;
pub mod telegram;
pub mod traits;

// Re-export commonly used types
pub use factory::create_backend;
pub use stream::progress_stream;
pub use telegram::{TelegramBotBackend, TelegramConfig};
pub use traits::{
    BackendError, BackendResult, Identity, MessagingBackend, ProgressSink,
    ResolvedEntity, SendFileRequest, SentMedia,
};
