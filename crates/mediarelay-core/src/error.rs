//! Error types module
//!
//! Domain errors for the upload pipeline (`StagingError`, `UploadError`) and the
//! unified `AppError` that the HTTP layer renders. Every domain error converts into
//! `AppError`, which self-describes its status code, machine code and log level
//! through [`ErrorMetadata`].

use crate::models::DestinationError;
use std::io;
use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for caller mistakes worth noticing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "BACKEND_FAILURE")
    fn error_code(&self) -> &'static str;

    /// Client-facing message, rendered as `detail`
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failures while materializing the upload source as a local file.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("File path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Failed to stage file: {0}")]
    Io(#[from] io::Error),
}

/// Failures of a single upload call. Preview failures never appear here.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error("Invalid chat id '{token}': {reason}")]
    InvalidDestination { token: String, reason: String },

    #[error("Upload failed: {0}")]
    Backend(String),

    #[error("No file name provided")]
    EmptyFileName,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Staging error: {0}")]
    Staging(#[source] StagingError),

    #[error("Invalid chat id '{token}': {reason}")]
    InvalidDestination { token: String, reason: String },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        AppError::Staging(err)
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Staging(e) => AppError::Staging(e),
            UploadError::InvalidDestination { token, reason } => {
                AppError::InvalidDestination { token, reason }
            }
            UploadError::Backend(msg) => AppError::Backend(msg),
            UploadError::EmptyFileName => {
                AppError::InvalidInput("No file name provided".to_string())
            }
        }
    }
}

impl From<DestinationError> for UploadError {
    fn from(err: DestinationError) -> Self {
        match err {
            DestinationError::Invalid { token, reason } => {
                UploadError::InvalidDestination { token, reason }
            }
        }
    }
}

impl AppError {
    /// Variant name for structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Staging(_) => "Staging",
            AppError::InvalidDestination { .. } => "InvalidDestination",
            AppError::Backend(_) => "Backend",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::PayloadTooLarge(_) => 413,
            AppError::Staging(StagingError::NotFound(_)) => 404,
            AppError::Staging(StagingError::NotAFile(_)) => 400,
            AppError::Staging(StagingError::Io(_)) => 500,
            AppError::InvalidDestination { .. } => 400,
            AppError::Backend(_) => 500,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Staging(StagingError::NotFound(_)) => "FILE_NOT_FOUND",
            AppError::Staging(StagingError::NotAFile(_)) => "NOT_A_FILE",
            AppError::Staging(StagingError::Io(_)) => "STAGING_IO_ERROR",
            AppError::InvalidDestination { .. } => "INVALID_DESTINATION",
            AppError::Backend(_) => "BACKEND_FAILURE",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Staging(StagingError::Io(e)) => {
                format!("Failed to process uploaded file: {}", e)
            }
            AppError::Staging(e) => e.to_string(),
            AppError::InvalidDestination { token, reason } => {
                format!("Invalid chat id '{}': {}", token, reason)
            }
            AppError::Backend(msg) => format!("Upload failed: {}", msg),
            AppError::Internal(msg) => msg.clone(),
            AppError::InternalWithSource { message, .. } => message.clone(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self.http_status_code() {
            400 => LogLevel::Debug,
            404 | 413 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_status_codes() {
        let not_found: AppError = StagingError::NotFound(PathBuf::from("/tmp/missing.mp4")).into();
        assert_eq!(not_found.http_status_code(), 404);
        assert!(not_found.client_message().contains("/tmp/missing.mp4"));

        let not_a_file: AppError = StagingError::NotAFile(PathBuf::from("/tmp")).into();
        assert_eq!(not_a_file.http_status_code(), 400);

        let io: AppError =
            StagingError::Io(io::Error::new(io::ErrorKind::Other, "disk full")).into();
        assert_eq!(io.http_status_code(), 500);
        assert!(io.client_message().contains("disk full"));
    }

    #[test]
    fn test_upload_error_conversion() {
        let err: AppError = UploadError::InvalidDestination {
            token: "notanumber".to_string(),
            reason: "invalid digit found in string".to_string(),
        }
        .into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_DESTINATION");
        assert!(err.client_message().contains("'notanumber'"));

        let err: AppError = UploadError::Backend("connection reset".to_string()).into();
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Upload failed: connection reset");

        let err: AppError = UploadError::EmptyFileName.into();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_log_levels_follow_status() {
        assert_eq!(
            AppError::InvalidInput("x".to_string()).log_level(),
            LogLevel::Debug
        );
        let missing: AppError = StagingError::NotFound(PathBuf::from("/tmp/x")).into();
        assert_eq!(missing.log_level(), LogLevel::Warn);
        assert_eq!(
            AppError::PayloadTooLarge("x".to_string()).log_level(),
            LogLevel::Warn
        );
        assert_eq!(AppError::Backend("x".to_string()).log_level(), LogLevel::Error);
    }

    #[test]
    fn test_destination_error_becomes_invalid_destination() {
        let err: UploadError = crate::models::Destination::resolve("notanumber")
            .unwrap_err()
            .into();
        match err {
            UploadError::InvalidDestination { token, .. } => assert_eq!(token, "notanumber"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_payload_too_large_status() {
        let err = AppError::PayloadTooLarge("Upload exceeds the configured size limit".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert_eq!(err.client_message(), "Upload exceeds the configured size limit");
    }

    #[test]
    fn test_anyhow_conversion_keeps_message() {
        let err: AppError = anyhow::anyhow!("listener closed").into();
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "listener closed");
        assert_eq!(err.error_type(), "Internal");
    }
}
