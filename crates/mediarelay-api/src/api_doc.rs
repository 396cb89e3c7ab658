//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use mediarelay_core::models;

/// Returns the OpenAPI spec served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediarelay API",
        version = "0.1.0",
        description = "Relays large media files to Telegram chats. Files arrive as multipart uploads or as paths on the relay host, are staged to disk, get a preview when they are videos, and are streamed to the Bot API."
    ),
    paths(
        // Uploads
        handlers::upload::upload_file,
        handlers::upload_by_path::upload_by_path,
        // Account
        handlers::account::get_me,
        handlers::account::get_group,
        // System
        handlers::health::health_check,
    ),
    components(schemas(
        models::UploadResponse,
        models::DialogsResponse,
        models::DialogEntry,
        handlers::upload_by_path::UploadByPathForm,
        handlers::health::HealthResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "upload", description = "Send files to a chat"),
        (name = "account", description = "Backend account information"),
        (name = "system", description = "Liveness"),
    )
)]
pub struct ApiDoc;
