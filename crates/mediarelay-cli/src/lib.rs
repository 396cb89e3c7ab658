//! HTTP client for a running media relay.
//!
//! Set MEDIARELAY_URL to point at the server (defaults to `http://localhost:8100`).

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8100";

#[derive(Clone, Debug)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self> {
        // No overall timeout: large uploads may legitimately take a long time.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: MEDIARELAY_URL.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("MEDIARELAY_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Stream a local file to `POST /upload`.
    pub async fn upload_file(
        &self,
        path: &Path,
        chat_id: &str,
        caption: Option<&str>,
    ) -> Result<Value> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .context("Path has no file name")?;
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let size = file.metadata().await?.len();

        tracing::debug!(file_name = %file_name, size, chat_id, "Uploading file");

        let part = Part::stream_with_length(Body::from(file), size).file_name(file_name);
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.unwrap_or_default().to_string())
            .part("file", part);

        let response = self
            .client
            .post(self.build_url("/upload"))
            .multipart(form)
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }

    /// Ask the relay to send a file that already exists on its host.
    pub async fn upload_by_path(
        &self,
        file_path: &str,
        chat_id: &str,
        caption: Option<&str>,
    ) -> Result<Value> {
        let mut params = vec![("file_path", file_path), ("chat_id", chat_id)];
        if let Some(caption) = caption {
            params.push(("caption", caption));
        }

        let response = self
            .client
            .post(self.build_url("/upload_by_path"))
            .form(&params)
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }

    pub async fn get_me(&self) -> Result<String> {
        self.get("/get/me").await
    }

    pub async fn list_dialogs(&self) -> Result<Value> {
        self.get("/get_group").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.build_url(path))
            .send()
            .await
            .context("Failed to send request")?;

        parse_response(response).await
    }
}

/// Deserialize a success body, or turn the relay's `{"detail": ...}` into an error.
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.context("Failed to read response body")?;

    if !status.is_success() {
        return Err(anyhow::anyhow!(
            "Request failed with status {}: {}",
            status,
            error_detail(&body)
        ));
    }

    serde_json::from_str(&body).context("Failed to parse response")
}

/// The `detail` field of an error body, or the raw body when it has none.
pub fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_trims_trailing_slash() {
        let client = RelayClient::new("http://relay:8100/").unwrap();
        assert_eq!(client.base_url(), "http://relay:8100");
        assert_eq!(client.build_url("/get/me"), "http://relay:8100/get/me");
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail":"File path does not exist: /tmp/x"}"#),
            "File path does not exist: /tmp/x"
        );
        assert_eq!(error_detail("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_detail(r#"{"other":1}"#), r#"{"other":1}"#);
    }
}
