//! Mediarelay Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the backend client, the media processing crate and the HTTP API.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, RelayConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, StagingError, UploadError};
pub use models::{Destination, DestinationError};
