//! Error types module
//!
//! All errors are unified under the `AppError` enum, which covers database,
//! storage, upload-protocol, and assignment errors. Each variant self-describes
//! its HTTP presentation through the `ErrorMetadata` trait so the API layer can
//! render a consistent response without matching on variants again.

use std::io;

use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "OFFSET_MISMATCH")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid upload length: declared {declared} bytes but received {received}")]
    InvalidLength { declared: i64, received: i64 },

    #[error("Upload offset mismatch: client sent {client}, server is at {server}")]
    OffsetMismatch { client: i64, server: i64 },

    #[error("Upload overflow: {offset} + {chunk} bytes exceeds declared length {declared}")]
    UploadOverflow {
        offset: i64,
        chunk: i64,
        declared: i64,
    },

    #[error("Unsupported tus protocol version: {0}")]
    UnsupportedTusVersion(String),

    #[error("No officers available in department: {0}")]
    NoOfficersAvailable(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Choose a different upload identifier"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidLength { .. } => (
            400,
            "INVALID_LENGTH",
            false,
            Some("Send the full payload declared in upload-length"),
            false,
            LogLevel::Debug,
        ),
        AppError::OffsetMismatch { .. } => (
            409,
            "OFFSET_MISMATCH",
            true,
            Some("Query the current offset with HEAD and resume from there"),
            false,
            LogLevel::Debug,
        ),
        AppError::UploadOverflow { .. } => (
            413,
            "UPLOAD_OVERFLOW",
            false,
            Some("Do not send more bytes than declared in upload-length"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsupportedTusVersion(_) => (
            412,
            "UNSUPPORTED_TUS_VERSION",
            false,
            Some("Use tus protocol version 1.0.0"),
            false,
            LogLevel::Debug,
        ),
        AppError::NoOfficersAvailable(_) => (
            409,
            "NO_OFFICERS_AVAILABLE",
            true,
            Some("Add officers to the department or pick another one"),
            false,
            LogLevel::Warn,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check the webhook secret or authentication token"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce upload size or split into chunks"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::InvalidLength { .. } => "InvalidLength",
            AppError::OffsetMismatch { .. } => "OffsetMismatch",
            AppError::UploadOverflow { .. } => "UploadOverflow",
            AppError::UnsupportedTusVersion(_) => "UnsupportedTusVersion",
            AppError::NoOfficersAvailable(_) => "NoOfficersAvailable",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::InvalidLength { declared, received } => format!(
                "Upload creation must carry the full payload: declared {} bytes, received {}",
                declared, received
            ),
            AppError::OffsetMismatch { client, server } => format!(
                "Upload offset mismatch: client sent {}, server is at {}",
                client, server
            ),
            AppError::UploadOverflow {
                offset,
                chunk,
                declared,
            } => format!(
                "Appending {} bytes at offset {} would exceed the declared length {}",
                chunk, offset, declared
            ),
            AppError::UnsupportedTusVersion(ref version) => {
                format!("Unsupported tus protocol version: {}", version)
            }
            AppError::NoOfficersAvailable(ref department) => {
                format!("No officers available in department: {}", department)
            }
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        let err = AppError::from(sqlx::Error::PoolClosed);
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_offset_mismatch() {
        let err = AppError::OffsetMismatch {
            client: 50,
            server: 30,
        };
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "OFFSET_MISMATCH");
        assert!(err.is_recoverable());
        assert!(err.client_message().contains("50"));
        assert!(err.client_message().contains("30"));
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_invalid_length() {
        let err = AppError::InvalidLength {
            declared: 100,
            received: 50,
        };
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_LENGTH");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("100"));
        assert!(err.client_message().contains("50"));
    }

    #[test]
    fn test_error_metadata_upload_overflow() {
        let err = AppError::UploadOverflow {
            offset: 80,
            chunk: 40,
            declared: 100,
        };
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "UPLOAD_OVERFLOW");
        assert!(err.client_message().contains("100"));
    }

    #[test]
    fn test_error_metadata_no_officers() {
        let err = AppError::NoOfficersAvailable("public_lighting".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "NO_OFFICERS_AVAILABLE");
        assert!(err.client_message().contains("public_lighting"));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err1 = AppError::OffsetMismatch {
            client: 1,
            server: 0,
        };
        assert_eq!(
            err1.suggested_action(),
            Some("Query the current offset with HEAD and resume from there")
        );

        let err2 = AppError::NotFound("test".to_string());
        assert_eq!(
            err2.suggested_action(),
            Some("Verify the resource ID exists")
        );

        let err3 = AppError::UnsupportedTusVersion("0.2.2".to_string());
        assert_eq!(err3.suggested_action(), Some("Use tus protocol version 1.0.0"));
    }
}
