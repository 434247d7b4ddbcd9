//! Storage abstraction trait
//!
//! All storage backends must implement this trait. The upload pipeline only
//! ever writes whole payloads or appends chunks at a known offset, so the
//! surface is deliberately small.

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction for photo bytes.
///
/// Keys are opaque identifiers derived from the client-chosen photo id; the
/// backend maps them to its own locations and derives public URLs from them.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write a complete payload under a fresh key and return its public URL.
    async fn write_new(&self, storage_key: &str, data: &[u8]) -> StorageResult<String>;

    /// Write bytes at the given offset of an existing object. The offset must
    /// not exceed the current size; callers enforce offset continuity before
    /// reaching the backend.
    async fn write_at(&self, storage_key: &str, offset: u64, data: &[u8]) -> StorageResult<()>;

    /// Read a whole object.
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete an object. Deleting a missing object is not an error; the
    /// metadata layer owns existence semantics.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if an object exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Size in bytes of an object, if it exists.
    async fn content_length(&self, storage_key: &str) -> StorageResult<u64>;

    /// Public URL for a key, without touching the backend.
    fn url_for(&self, storage_key: &str) -> String;
}
