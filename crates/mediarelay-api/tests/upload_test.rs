mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{setup_test_app, SELF_CHAT_ID};
use serde_json::Value;

const MIB: usize = 1024 * 1024;

fn video_form(file_name: &str, size: usize, chat_id: &str, caption: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("chat_id", chat_id.to_string())
        .add_text("caption", caption.to_string())
        .add_part(
            "file",
            Part::bytes(vec![7u8; size])
                .file_name(file_name.to_string())
                .mime_type("video/mp4"),
        )
}

#[tokio::test]
async fn test_upload_to_self_chat_defaults_caption() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(video_form("clip.mp4", 5 * MIB, "me", ""))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["uploaded_to_chat_id"], "me");
    assert_eq!(body["file_name"], "clip.mp4");
    assert_eq!(body["size_mb"].as_f64(), Some(5.0));
    assert_eq!(body["file_id"], "file-1");
    assert_eq!(body["access_hash"], "unique-1");
    assert_eq!(body["message_id"], 1);

    let sent = app.backend.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, SELF_CHAT_ID);
    assert_eq!(sent[0].caption, "clip.mp4");
    assert_eq!(sent[0].size_bytes, (5 * MIB) as u64);
    assert!(sent[0].supports_streaming);

    assert!(!sent[0].staged_path.exists());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_fields_after_file_and_explicit_caption() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(b"%PDF-1.4".to_vec())
                .file_name("report.pdf")
                .mime_type("application/pdf"),
        )
        .add_text("caption", "Quarterly report")
        .add_text("chat_id", "-1001234");

    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let sent = app.backend.sent();
    assert_eq!(sent[0].chat_id, -1001234);
    assert_eq!(sent[0].caption, "Quarterly report");
    assert_eq!(sent[0].file_name, "report.pdf");
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_invalid_chat_id_is_rejected_and_cleaned_up() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(video_form("clip.mp4", 64 * 1024, "notanumber", "hi"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("notanumber"));

    assert!(app.backend.sent().is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_unknown_chat_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload")
        .multipart(video_form("clip.mp4", 1024, "404", ""))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("404"));
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_empty_file_name_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_text("chat_id", "me")
        .add_part("file", Part::bytes(vec![1u8; 128]).file_name(""));

    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.backend.sent().is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_missing_chat_id_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![1u8; 128]).file_name("clip.mp4"),
    );

    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("chat_id"));
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_text("chat_id", "me");
    let response = app.client().post("/upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["detail"], "No file provided");
}

#[tokio::test]
async fn test_upload_by_path_missing_file_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload_by_path")
        .form(&[
            ("file_path", "/tmp/missing.mp4"),
            ("chat_id", "me"),
            ("caption", ""),
        ])
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("missing.mp4"));
    assert!(app.backend.sent().is_empty());
}

#[tokio::test]
async fn test_upload_by_path_sends_and_keeps_file() {
    let app = setup_test_app().await;
    let source_dir = tempfile::tempdir().unwrap();
    let path = source_dir.path().join("holiday.mp4");
    std::fs::write(&path, vec![5u8; 2 * MIB]).unwrap();

    let response = app
        .client()
        .post("/upload_by_path")
        .form(&[
            ("file_path", path.to_str().unwrap()),
            ("chat_id", "123456"),
        ])
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["file_name"], "holiday.mp4");
    assert_eq!(body["size_mb"].as_f64(), Some(2.0));
    assert_eq!(body["uploaded_to_chat_id"], "123456");

    let sent = app.backend.sent();
    assert_eq!(sent[0].chat_id, 123456);
    assert_eq!(sent[0].caption, "holiday.mp4");
    assert_eq!(sent[0].staged_path, path);

    assert!(path.exists());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_upload_by_path_accepts_multipart_fields() {
    let app = setup_test_app().await;
    let source_dir = tempfile::tempdir().unwrap();
    let path = source_dir.path().join("notes.txt");
    std::fs::write(&path, b"hello").unwrap();

    let form = MultipartForm::new()
        .add_text("file_path", path.to_str().unwrap().to_string())
        .add_text("chat_id", "me")
        .add_text("caption", "notes");

    let response = app.client().post("/upload_by_path").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let sent = app.backend.sent();
    assert_eq!(sent[0].caption, "notes");
    assert!(path.exists());
}

#[tokio::test]
async fn test_upload_by_path_directory_is_bad_request() {
    let app = setup_test_app().await;
    let dir = tempfile::tempdir().unwrap();

    let response = app
        .client()
        .post("/upload_by_path")
        .form(&[("file_path", dir.path().to_str().unwrap()), ("chat_id", "me")])
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_upload_by_path_missing_chat_id_is_bad_request() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/upload_by_path")
        .form(&[("file_path", "/tmp/missing.mp4")])
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["detail"].is_string());
}
