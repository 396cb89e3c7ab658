//! Domain models

pub mod destination;
pub mod dialog;
pub mod upload;

pub use destination::{Destination, DestinationError};
pub use dialog::{DialogEntry, DialogsResponse};
pub use upload::{UploadResponse, UploadResult};
