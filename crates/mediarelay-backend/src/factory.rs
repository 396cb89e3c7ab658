use crate::{BackendResult, MessagingBackend, TelegramBotBackend, TelegramConfig};
use mediarelay_core::Config;
use std::sync::Arc;

/// Create the messaging backend based on configuration
pub fn create_backend(config: &Config) -> BackendResult<Arc<dyn MessagingBackend>> {
    let telegram = TelegramConfig::from_config(config);

    tracing::info!(
        api_url = %telegram.api_url,
        self_chat_configured = telegram.self_chat_id.is_some(),
        upload_timeout_secs = telegram.upload_timeout.as_secs(),
        "Creating Telegram Bot API backend"
    );

    let backend = TelegramBotBackend::new(telegram)?;
    Ok(Arc::new(backend))
}
