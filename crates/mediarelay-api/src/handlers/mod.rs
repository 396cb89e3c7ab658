pub mod account;
pub mod health;
pub mod upload;
pub mod upload_by_path;
