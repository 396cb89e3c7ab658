use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{UploadRequest, UploadSource};
use crate::state::AppState;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use mediarelay_core::models::UploadResponse;
use mediarelay_core::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadByPathForm {
    /// Absolute path of a regular file on the relay host
    pub file_path: String,
    #[serde(default)]
    pub caption: Option<String>,
    /// `me` or a numeric chat id
    pub chat_id: String,
}

/// Accepts the form either url-encoded or as multipart text fields.
pub struct PathForm(pub UploadByPathForm);

impl<S> FromRequest<S> for PathForm
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<UploadByPathForm>::from_request(req, state).await?;
            return Ok(PathForm(form));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e.body_text())))?;

        let mut file_path = None;
        let mut caption = None;
        let mut chat_id = None;
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(|s| s.to_string()).unwrap_or_default();
            match name.as_str() {
                "file_path" => file_path = Some(field.text().await?),
                "caption" => caption = Some(field.text().await?),
                "chat_id" => chat_id = Some(field.text().await?),
                _ => {}
            }
        }

        let missing = |field: &str| AppError::InvalidInput(format!("Missing required field: {}", field));
        Ok(PathForm(UploadByPathForm {
            file_path: file_path.ok_or_else(|| missing("file_path"))?,
            caption,
            chat_id: chat_id.ok_or_else(|| missing("chat_id"))?,
        }))
    }
}

/// Upload a file that already exists on the relay host. The file is never deleted.
#[utoipa::path(
    post,
    path = "/upload_by_path",
    tag = "upload",
    request_body(content = UploadByPathForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "Path is not a file, missing field or invalid chat id", body = ErrorResponse),
        (status = 404, description = "Path does not exist", body = ErrorResponse),
        (status = 500, description = "Backend failure", body = ErrorResponse)
    )
)]
pub async fn upload_by_path(
    State(state): State<Arc<AppState>>,
    PathForm(form): PathForm,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let path = PathBuf::from(&form.file_path);
    let file_name = Path::new(&form.file_path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    tracing::debug!(path = %path.display(), chat_id = %form.chat_id, "Upload by path requested");

    let request = UploadRequest {
        source: UploadSource::LocalPath(path),
        file_name,
        caption: form.caption,
        destination: form.chat_id,
    };

    let result = state.upload_service.upload(request).await?;
    Ok(Json(result.into()))
}
