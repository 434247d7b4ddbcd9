//! Participium Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! upload-session transition logic shared across all Participium components.

pub mod config;
pub mod error;
pub mod models;
pub mod upload;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use upload::UploadTransition;
