//! Test helpers: build AppState and router for integration tests.
//!
//! The messaging backend is replaced by [`FakeBackend`], which records what it was
//! asked to send; no network access is needed.

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use mediarelay_api::setup::{routes, services};
use mediarelay_backend::{
    BackendError, BackendResult, Identity, MessagingBackend, ProgressSink, ResolvedEntity,
    SendFileRequest, SentMedia,
};
use mediarelay_core::models::{DialogEntry, Destination};
use mediarelay_core::{Config, RelayConfig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const SELF_CHAT_ID: i64 = 777;
pub const UNKNOWN_CHAT_ID: i64 = 404;

/// What the fake saw for one send call.
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub chat_id: i64,
    pub file_name: String,
    pub caption: String,
    pub size_bytes: u64,
    pub supports_streaming: bool,
    pub staged_path: std::path::PathBuf,
}

#[derive(Default)]
pub struct FakeBackend {
    pub sent: Mutex<Vec<SentRecord>>,
}

impl FakeBackend {
    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingBackend for FakeBackend {
    async fn resolve_entity(&self, destination: &Destination) -> BackendResult<ResolvedEntity> {
        match destination {
            Destination::SelfChat => Ok(ResolvedEntity {
                chat_id: SELF_CHAT_ID,
                display_name: Some("Saved".to_string()),
            }),
            Destination::NumericId(UNKNOWN_CHAT_ID) => Err(BackendError::EntityNotFound(
                "Bad Request: chat not found".to_string(),
            )),
            Destination::NumericId(id) => Ok(ResolvedEntity {
                chat_id: *id,
                display_name: None,
            }),
        }
    }

    async fn send_file_with_progress(
        &self,
        request: SendFileRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> BackendResult<SentMedia> {
        let on_disk = std::fs::metadata(&request.path)?.len();
        progress.on_progress(0, request.size_bytes);
        progress.on_progress(on_disk, request.size_bytes);

        let message_id = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentRecord {
                chat_id: request.entity.chat_id,
                file_name: request.file_name.clone(),
                caption: request.caption.clone(),
                size_bytes: request.size_bytes,
                supports_streaming: request.supports_streaming,
                staged_path: request.path.clone(),
            });
            sent.len() as i64
        };

        Ok(SentMedia {
            message_id,
            file_id: format!("file-{}", message_id),
            file_unique_id: format!("unique-{}", message_id),
            size_bytes: on_disk,
        })
    }

    async fn get_me(&self) -> BackendResult<Identity> {
        Ok(Identity {
            id: 99,
            is_bot: true,
            first_name: "Relay".to_string(),
            last_name: None,
            username: Some("relay_bot".to_string()),
        })
    }

    async fn list_dialogs(&self) -> BackendResult<Vec<DialogEntry>> {
        Ok(vec![
            DialogEntry {
                name: "Saved".to_string(),
                id: SELF_CHAT_ID,
            },
            DialogEntry {
                name: "Uploads".to_string(),
                id: -1001234,
            },
        ])
    }
}

/// Test application: server, fake backend and owned staging directory.
pub struct TestApp {
    pub server: TestServer,
    pub backend: Arc<FakeBackend>,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn staging_path(&self) -> &Path {
        self.staging_dir.path()
    }

    /// Files left behind in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path()).unwrap().count()
    }
}

fn test_config(staging_dir: &Path, extra_env: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("TELEGRAM_BOT_TOKEN", "123:test".to_string()),
        ("STAGING_DIR", staging_dir.display().to_string()),
        ("PREVIEW_ENABLED", "false".to_string()),
        ("ENVIRONMENT", "test".to_string()),
    ]);
    for (key, value) in extra_env {
        vars.insert(*key, value.to_string());
    }
    let config = RelayConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
    Config(Box::new(config))
}

/// Router, fake backend and staging directory, for tests that drive the router
/// without a `TestServer`.
pub async fn build_router(extra_env: &[(&str, &str)]) -> (Router, Arc<FakeBackend>, TempDir) {
    let staging_dir = tempfile::tempdir().unwrap();
    let config = test_config(staging_dir.path(), extra_env);
    config.validate().unwrap();

    let backend = Arc::new(FakeBackend::default());
    let state = services::initialize_services(&config, backend.clone())
        .await
        .unwrap();

    (routes::setup_routes(&config, state), backend, staging_dir)
}

/// Setup a test app backed by [`FakeBackend`] and a fresh staging directory.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_env(&[]).await
}

/// Same as [`setup_test_app`] with extra environment overrides.
pub async fn setup_test_app_with_env(extra_env: &[(&str, &str)]) -> TestApp {
    let (router, backend, staging_dir) = build_router(extra_env).await;

    TestApp {
        server: TestServer::new(router).unwrap(),
        backend,
        staging_dir,
    }
}
