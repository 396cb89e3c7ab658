//! Configuration module
//!
//! Settings come from environment variables, optionally seeded from a `.env` file.
//! Backend credentials, listen address, staging directory and the ffmpeg toolchain
//! are all configured here.

use std::env;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8100;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const UPLOAD_CHUNK_SIZE_KB: usize = 1024;
const MAX_UPLOAD_SIZE_MB: usize = 2048;
const PREVIEW_TIMEOUT_SECS: u64 = 30;
const BACKEND_TIMEOUT_SECS: u64 = 3600;
const BACKEND_MAX_CONCURRENT_TRANSFERS: usize = 1;
const HTTP_CONCURRENCY_LIMIT: usize = 64;

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub host: String,
    pub server_port: u16,
    pub environment: String,
    // Backend
    pub telegram_bot_token: String,
    pub telegram_api_url: String,
    pub telegram_self_chat_id: Option<i64>,
    pub backend_timeout_secs: u64,
    pub backend_max_concurrent_transfers: usize,
    // Staging
    pub staging_dir: PathBuf,
    pub upload_chunk_size_bytes: usize,
    pub max_upload_size_bytes: usize,
    // Preview generation
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub preview_enabled: bool,
    pub preview_timeout_secs: u64,
    // HTTP
    pub http_concurrency_limit: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<RelayConfig>);

impl Config {
    fn inner(&self) -> &RelayConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = RelayConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn host(&self) -> &str {
        &self.inner().host
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn telegram_bot_token(&self) -> &str {
        &self.inner().telegram_bot_token
    }

    pub fn telegram_api_url(&self) -> &str {
        &self.inner().telegram_api_url
    }

    pub fn telegram_self_chat_id(&self) -> Option<i64> {
        self.inner().telegram_self_chat_id
    }

    pub fn backend_timeout_secs(&self) -> u64 {
        self.inner().backend_timeout_secs
    }

    pub fn backend_max_concurrent_transfers(&self) -> usize {
        self.inner().backend_max_concurrent_transfers
    }

    pub fn staging_dir(&self) -> &PathBuf {
        &self.inner().staging_dir
    }

    pub fn upload_chunk_size_bytes(&self) -> usize {
        self.inner().upload_chunk_size_bytes
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    pub fn preview_enabled(&self) -> bool {
        self.inner().preview_enabled
    }

    pub fn preview_timeout_secs(&self) -> u64 {
        self.inner().preview_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().http_concurrency_limit
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.trim().to_lowercase())
        .and_then(|v| match v.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl RelayConfig {
    /// Build configuration from a key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let telegram_self_chat_id = match lookup("TELEGRAM_SELF_CHAT_ID") {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<i64>().map_err(|_| {
                anyhow::anyhow!("TELEGRAM_SELF_CHAT_ID must be a numeric chat id")
            })?),
            _ => None,
        };

        let upload_chunk_size_kb = lookup("UPLOAD_CHUNK_SIZE_KB")
            .unwrap_or_else(|| UPLOAD_CHUNK_SIZE_KB.to_string())
            .parse::<usize>()
            .unwrap_or(UPLOAD_CHUNK_SIZE_KB);

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        Ok(RelayConfig {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            server_port: lookup("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            telegram_bot_token: lookup("TELEGRAM_BOT_TOKEN")
                .ok_or_else(|| anyhow::anyhow!("TELEGRAM_BOT_TOKEN must be set"))?,
            telegram_api_url: lookup("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            telegram_self_chat_id,
            backend_timeout_secs: lookup("BACKEND_TIMEOUT_SECS")
                .unwrap_or_else(|| BACKEND_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(BACKEND_TIMEOUT_SECS),
            backend_max_concurrent_transfers: lookup("BACKEND_MAX_CONCURRENT_TRANSFERS")
                .unwrap_or_else(|| BACKEND_MAX_CONCURRENT_TRANSFERS.to_string())
                .parse()
                .unwrap_or(BACKEND_MAX_CONCURRENT_TRANSFERS),
            staging_dir: lookup("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            upload_chunk_size_bytes: upload_chunk_size_kb * 1024,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            preview_enabled: parse_bool(lookup("PREVIEW_ENABLED"), true),
            preview_timeout_secs: lookup("PREVIEW_TIMEOUT_SECS")
                .unwrap_or_else(|| PREVIEW_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(PREVIEW_TIMEOUT_SECS),
            http_concurrency_limit: lookup("HTTP_CONCURRENCY_LIMIT")
                .unwrap_or_else(|| HTTP_CONCURRENCY_LIMIT.to_string())
                .parse()
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.telegram_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("TELEGRAM_BOT_TOKEN must not be empty"));
        }

        if !self.telegram_api_url.starts_with("http://")
            && !self.telegram_api_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "TELEGRAM_API_URL must be an http(s) URL"
            ));
        }

        if self.upload_chunk_size_bytes == 0 {
            return Err(anyhow::anyhow!("UPLOAD_CHUNK_SIZE_KB must be greater than 0"));
        }

        if self.backend_max_concurrent_transfers == 0 {
            return Err(anyhow::anyhow!(
                "BACKEND_MAX_CONCURRENT_TRANSFERS must be greater than 0"
            ));
        }

        if self.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be greater than 0"));
        }

        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        for (name, path) in [
            ("FFMPEG_PATH", &self.ffmpeg_path),
            ("FFPROBE_PATH", &self.ffprobe_path),
        ] {
            if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
                return Err(anyhow::anyhow!("{} contains invalid characters", name));
            }
        }

        if self.staging_dir.exists() && !self.staging_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "STAGING_DIR {} is not a directory",
                self.staging_dir.display()
            ));
        }

        Ok(())
    }
}
