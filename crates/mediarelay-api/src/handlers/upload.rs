use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{StagedFile, UploadRequest, UploadSource};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use futures::TryStreamExt;
use mediarelay_core::models::UploadResponse;
use mediarelay_core::{AppError, UploadError};
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Last path component of a client-supplied file name.
fn display_file_name(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Upload a file sent as multipart form data.
///
/// The `file` part is streamed straight to the staging directory as it arrives, so
/// `caption` and `chat_id` may come before or after it.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `file` (binary), `chat_id` (`me` or numeric id), `caption` (optional)"),
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "Empty file name, missing field or invalid chat id", body = ErrorResponse),
        (status = 413, description = "Body exceeds the configured upload limit"),
        (status = 500, description = "Staging or backend failure", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let mut staged: Option<StagedFile> = None;
    let mut caption: Option<String> = None;
    let mut chat_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if staged.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    )
                    .into());
                }

                let file_name = field.file_name().map(display_file_name).unwrap_or_default();
                if file_name.trim().is_empty() {
                    return Err(UploadError::EmptyFileName.into());
                }

                let body = field.map_err(|e| io::Error::new(io::ErrorKind::Other, e));
                staged = Some(
                    state
                        .upload_service
                        .stager()
                        .stage_stream(&file_name, body)
                        .await?,
                );
            }
            "caption" => caption = Some(field.text().await?),
            "chat_id" => chat_id = Some(field.text().await?),
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    // A staged file dropped on these early returns is deleted with it.
    let staged =
        staged.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    let chat_id = chat_id
        .ok_or_else(|| AppError::InvalidInput("Missing required field: chat_id".to_string()))?;

    let request = UploadRequest {
        file_name: staged.file_name().to_string(),
        source: UploadSource::Staged(staged),
        caption,
        destination: chat_id,
    };

    let result = state.upload_service.upload(request).await?;
    Ok(Json(result.into()))
}
