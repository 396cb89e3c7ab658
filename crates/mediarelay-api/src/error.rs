//! HTTP error response conversion
//!
//! This module renders `AppError` as HTTP responses with a `{"detail": ...}` body.
//!
//! **Handler pattern:** Return `Result<Json<T>, HttpAppError>` and use `?` on any
//! error that converts into `AppError`; status, body and logging stay consistent.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediarelay_core::{AppError, ErrorMetadata, LogLevel, StagingError, UploadError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable description of what went wrong
    pub detail: String,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from mediarelay-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<UploadError> for HttpAppError {
    fn from(err: UploadError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

const PAYLOAD_TOO_LARGE_DETAIL: &str = "Upload exceeds the configured size limit";

/// A chunked body that overruns the request limit fails mid-stream as a multipart
/// read error rather than being rejected up front.
fn exceeds_body_limit(err: &MultipartError) -> bool {
    err.status() == StatusCode::PAYLOAD_TOO_LARGE
}

impl From<StagingError> for HttpAppError {
    fn from(err: StagingError) -> Self {
        if let StagingError::Io(io_err) = &err {
            let over_limit = io_err
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>())
                .is_some_and(exceeds_body_limit);
            if over_limit {
                return HttpAppError(AppError::PayloadTooLarge(
                    PAYLOAD_TOO_LARGE_DETAIL.to_string(),
                ));
            }
        }
        HttpAppError(AppError::from(err))
    }
}

/// Malformed multipart bodies are client errors.
impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        if exceeds_body_limit(&err) {
            return HttpAppError(AppError::PayloadTooLarge(
                PAYLOAD_TOO_LARGE_DETAIL.to_string(),
            ));
        }
        HttpAppError(AppError::InvalidInput(format!(
            "Failed to read multipart body: {}",
            err.body_text()
        )))
    }
}

/// Missing or malformed form fields become a 400 in our body format.
impl From<FormRejection> for HttpAppError {
    fn from(rejection: FormRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid form body: {}",
            rejection.body_text()
        )))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, error_code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, error_code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, error_code, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = Json(ErrorResponse {
            detail: app_error.client_message(),
        });

        (status, body).into_response()
    }
}
