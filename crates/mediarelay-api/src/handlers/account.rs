//! Pass-through endpoints over the backend session.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, Json};
use mediarelay_core::models::DialogsResponse;
use mediarelay_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/get/me",
    tag = "account",
    responses(
        (status = 200, description = "Description of the authenticated account", body = String),
        (status = 500, description = "Backend failure", body = ErrorResponse)
    )
)]
pub async fn get_me(State(state): State<Arc<AppState>>) -> Result<Json<String>, HttpAppError> {
    let identity = state
        .backend
        .get_me()
        .await
        .map_err(|e| AppError::Backend(e.to_string()))?;

    Ok(Json(identity.to_string()))
}

#[utoipa::path(
    get,
    path = "/get_group",
    tag = "account",
    responses(
        (status = 200, description = "Conversations reachable by the account", body = DialogsResponse),
        (status = 500, description = "Backend failure", body = ErrorResponse)
    )
)]
pub async fn get_group(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DialogsResponse>, HttpAppError> {
    let dialogs = state
        .backend
        .list_dialogs()
        .await
        .map_err(|e| AppError::Backend(e.to_string()))?;

    tracing::debug!(count = dialogs.len(), "Listed dialogs");
    Ok(Json(DialogsResponse::from(dialogs)))
}
