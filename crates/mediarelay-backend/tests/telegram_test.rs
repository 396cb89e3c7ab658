//! Telegram backend against an in-process Bot API stand-in.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use mediarelay_backend::{
    BackendError, MessagingBackend, ProgressSink, ResolvedEntity, SendFileRequest,
    TelegramBotBackend, TelegramConfig,
};
use mediarelay_core::Destination;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TOKEN: &str = "TEST_TOKEN";
const KNOWN_CHAT: i64 = 42;
const SELF_CHAT: i64 = 7;

/// Fields received by the last send call: name -> (file name, byte length or text).
#[derive(Default)]
struct Received {
    method: Option<String>,
    fields: HashMap<String, (Option<String>, Vec<u8>)>,
}

type Shared = Arc<Mutex<Received>>;

fn chat_json(id: i64) -> Value {
    match id {
        KNOWN_CHAT => json!({"id": KNOWN_CHAT, "type": "supergroup", "title": "Uploads"}),
        SELF_CHAT => json!({"id": SELF_CHAT, "type": "private", "first_name": "Owner"}),
        _ => Value::Null,
    }
}

async fn get_chat(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let id: i64 = params
        .get("chat_id")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();

    match chat_json(id) {
        Value::Null if id == 403 => (
            StatusCode::FORBIDDEN,
            Json(json!({"ok": false, "error_code": 403, "description": "Forbidden: bot is not a member of the channel chat"})),
        ),
        Value::Null if id == 500 => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error_code": 500, "description": "Internal Server Error"})),
        ),
        Value::Null => (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
        ),
        chat => (StatusCode::OK, Json(json!({"ok": true, "result": chat}))),
    }
}

async fn record_send(state: &Shared, method: &str, mut multipart: Multipart) -> Value {
    let mut received = HashMap::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap();
        received.insert(name, (file_name, data.to_vec()));
    }

    let media_field = if method == "sendVideo" { "video" } else { "document" };
    let size = received
        .get(media_field)
        .map(|(_, data)| data.len())
        .unwrap_or_default();

    {
        let mut guard = state.lock().unwrap();
        guard.method = Some(method.to_string());
        guard.fields = received;
    }

    let mut message = json!({
        "message_id": 501,
        "chat": {"id": KNOWN_CHAT, "title": "Uploads"}
    });
    message[media_field] = json!({
        "file_id": format!("{}-file-id", media_field),
        "file_unique_id": "AgADunique",
        "file_size": size
    });

    json!({"ok": true, "result": message})
}

async fn send_video(State(state): State<Shared>, multipart: Multipart) -> Json<Value> {
    Json(record_send(&state, "sendVideo", multipart).await)
}

async fn send_document(State(state): State<Shared>, multipart: Multipart) -> Json<Value> {
    Json(record_send(&state, "sendDocument", multipart).await)
}

async fn get_me() -> Json<Value> {
    Json(json!({
        "ok": true,
        "result": {"id": 99, "is_bot": true, "first_name": "Relay", "username": "relay_bot"}
    }))
}

async fn get_updates() -> Json<Value> {
    Json(json!({
        "ok": true,
        "result": [
            {"update_id": 1, "message": {"message_id": 1, "chat": {"id": KNOWN_CHAT, "title": "Uploads"}}},
            {"update_id": 2, "channel_post": {"message_id": 2, "chat": {"id": -1001, "title": "News"}}},
            {"update_id": 3, "message": {"message_id": 3, "chat": {"id": KNOWN_CHAT, "title": "Uploads"}}},
            {"update_id": 4, "my_chat_member": {"chat": {"id": SELF_CHAT, "first_name": "Owner"}}}
        ]
    }))
}

async fn spawn_bot_api() -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(Received::default()));
    let prefix = format!("/bot{}", TOKEN);

    let app = Router::new()
        .route(&format!("{}/getChat", prefix), get(get_chat))
        .route(&format!("{}/getMe", prefix), get(get_me))
        .route(&format!("{}/getUpdates", prefix), get(get_updates))
        .route(&format!("{}/sendVideo", prefix), post(send_video))
        .route(&format!("{}/sendDocument", prefix), post(send_document))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

fn backend(api_url: String, self_chat_id: Option<i64>) -> TelegramBotBackend {
    TelegramBotBackend::new(TelegramConfig {
        bot_token: TOKEN.to_string(),
        api_url,
        self_chat_id,
        upload_timeout: Duration::from_secs(30),
    })
    .unwrap()
}

#[derive(Default)]
struct Recorder(Mutex<Vec<(u64, u64)>>);

impl ProgressSink for Recorder {
    fn on_progress(&self, bytes_sent: u64, total_bytes: u64) {
        self.0.lock().unwrap().push((bytes_sent, total_bytes));
    }
}

fn send_request(path: &std::path::Path, file_name: &str, size: u64) -> SendFileRequest {
    SendFileRequest {
        entity: ResolvedEntity {
            chat_id: KNOWN_CHAT,
            display_name: Some("Uploads".to_string()),
        },
        path: path.to_path_buf(),
        file_name: file_name.to_string(),
        size_bytes: size,
        caption: file_name.to_string(),
        supports_streaming: true,
        preview: Some(Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9])),
    }
}

#[tokio::test]
async fn test_resolve_known_and_unknown_chats() {
    let (url, _) = spawn_bot_api().await;
    let backend = backend(url, Some(SELF_CHAT));

    let resolved = backend
        .resolve_entity(&Destination::NumericId(KNOWN_CHAT))
        .await
        .unwrap();
    assert_eq!(resolved.chat_id, KNOWN_CHAT);
    assert_eq!(resolved.display_name.as_deref(), Some("Uploads"));

    let me = backend.resolve_entity(&Destination::SelfChat).await.unwrap();
    assert_eq!(me.chat_id, SELF_CHAT);

    match backend.resolve_entity(&Destination::NumericId(12345)).await {
        Err(BackendError::EntityNotFound(reason)) => assert!(reason.contains("chat not found")),
        other => panic!("unexpected: {:?}", other),
    }

    assert!(matches!(
        backend.resolve_entity(&Destination::NumericId(403)).await,
        Err(BackendError::EntityNotFound(_))
    ));
}

#[tokio::test]
async fn test_server_error_during_resolution_is_not_entity_error() {
    let (url, _) = spawn_bot_api().await;
    let backend = backend(url, None);

    assert!(matches!(
        backend.resolve_entity(&Destination::NumericId(500)).await,
        Err(BackendError::Api { code: 500, .. })
    ));
}

#[tokio::test]
async fn test_send_video_streams_file_with_thumbnail() {
    let (url, state) = spawn_bot_api().await;
    let backend = backend(url, None);

    let temp = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    let size = 1_300_000usize;
    std::fs::write(temp.path(), vec![3u8; size]).unwrap();

    let recorder = Arc::new(Recorder::default());
    let sent = backend
        .send_file_with_progress(send_request(temp.path(), "clip.mp4", size as u64), recorder.clone())
        .await
        .unwrap();

    assert_eq!(sent.message_id, 501);
    assert_eq!(sent.file_id, "video-file-id");
    assert_eq!(sent.file_unique_id, "AgADunique");
    assert_eq!(sent.size_bytes, size as u64);

    let received = state.lock().unwrap();
    assert_eq!(received.method.as_deref(), Some("sendVideo"));
    let (video_name, video) = &received.fields["video"];
    assert_eq!(video_name.as_deref(), Some("clip.mp4"));
    assert_eq!(video.len(), size);
    assert_eq!(received.fields["supports_streaming"].1, b"true");
    assert_eq!(received.fields["caption"].1, b"clip.mp4");
    assert_eq!(received.fields["chat_id"].1, KNOWN_CHAT.to_string().as_bytes());
    assert_eq!(received.fields["thumbnail"].1, vec![0xFF, 0xD8, 0xFF, 0xD9]);

    let calls = recorder.0.lock().unwrap();
    assert_eq!(calls.last(), Some(&(size as u64, size as u64)));
}

#[tokio::test]
async fn test_non_video_goes_through_send_document() {
    let (url, state) = spawn_bot_api().await;
    let backend = backend(url, None);

    let temp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), b"%PDF-1.4").unwrap();

    let mut request = send_request(temp.path(), "report.pdf", 8);
    request.preview = None;

    let sent = backend
        .send_file_with_progress(request, Arc::new(Recorder::default()))
        .await
        .unwrap();
    assert_eq!(sent.file_id, "document-file-id");

    let received = state.lock().unwrap();
    assert_eq!(received.method.as_deref(), Some("sendDocument"));
    assert!(!received.fields.contains_key("supports_streaming"));
    assert!(!received.fields.contains_key("thumbnail"));
}

#[tokio::test]
async fn test_get_me_and_dialogs() {
    let (url, _) = spawn_bot_api().await;
    let backend = backend(url, Some(SELF_CHAT));

    let me = backend.get_me().await.unwrap();
    assert_eq!(me.id, 99);
    assert_eq!(me.username.as_deref(), Some("relay_bot"));

    let dialogs = backend.list_dialogs().await.unwrap();
    let ids: Vec<i64> = dialogs.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![SELF_CHAT, KNOWN_CHAT, -1001]);
    assert_eq!(dialogs[0].name, "Owner");
    assert_eq!(dialogs[2].name, "News");
}

#[tokio::test]
async fn test_unreachable_api_is_http_error() {
    // Nothing listens on port 9 locally.
    let backend = backend("http://127.0.0.1:9".to_string(), None);
    let err = backend.get_me().await.unwrap_err();
    assert!(matches!(err, BackendError::Http(_)));
    assert!(!err.to_string().contains(TOKEN));
}
