use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome of a completed upload, built once from the backend's returned metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub file_id: String,
    pub access_token: String,
    pub file_name: String,
    /// Size in megabytes, rounded to two decimal places.
    pub size_mb: f64,
    pub message_id: i64,
    /// The destination token exactly as the caller supplied it.
    pub destination: String,
}

/// Response body for `POST /upload` and `POST /upload_by_path`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub uploaded_to_chat_id: String,
    pub file_id: String,
    pub access_hash: String,
    pub file_name: String,
    pub size_mb: f64,
    pub message_id: i64,
}

impl From<UploadResult> for UploadResponse {
    fn from(result: UploadResult) -> Self {
        Self {
            success: true,
            message: format!("File uploaded successfully to {}", result.destination),
            uploaded_to_chat_id: result.destination,
            file_id: result.file_id,
            access_hash: result.access_token,
            file_name: result.file_name,
            size_mb: result.size_mb,
            message_id: result.message_id,
        }
    }
}
