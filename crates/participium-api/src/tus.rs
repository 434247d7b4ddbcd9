//! tus protocol header handling.
//!
//! Parsing and validation for the resumable-upload headers: version token,
//! declared length, running offset, and the `upload-metadata` key/value pairs.
//! Handlers stay thin by delegating all header plumbing here.

use std::collections::HashMap;

use axum::http::HeaderMap;
use base64::Engine;
use participium_core::AppError;

use crate::constants::TUS_VERSION;

/// Header carrying the protocol version on every request and response.
pub const TUS_RESUMABLE: &str = "tus-resumable";
pub const UPLOAD_LENGTH: &str = "upload-length";
pub const UPLOAD_OFFSET: &str = "upload-offset";
pub const UPLOAD_METADATA: &str = "upload-metadata";

/// Content type required on APPEND requests.
pub const OFFSET_OCTET_STREAM: &str = "application/offset+octet-stream";

/// Reject requests that do not declare the supported protocol version.
pub fn require_supported_version(headers: &HeaderMap) -> Result<(), AppError> {
    let version = headers
        .get(TUS_RESUMABLE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if version != TUS_VERSION {
        return Err(AppError::UnsupportedTusVersion(if version.is_empty() {
            "(missing)".to_string()
        } else {
            version.to_string()
        }));
    }
    Ok(())
}

/// Parse the declared total length. Must be a positive integer.
pub fn parse_upload_length(headers: &HeaderMap) -> Result<i64, AppError> {
    let raw = headers
        .get(UPLOAD_LENGTH)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::InvalidInput(format!("Missing {} header", UPLOAD_LENGTH))
        })?;
    let length: i64 = raw.parse().map_err(|_| {
        AppError::InvalidInput(format!("Invalid {} header: {}", UPLOAD_LENGTH, raw))
    })?;
    if length <= 0 {
        return Err(AppError::InvalidInput(format!(
            "{} must be a positive integer, got {}",
            UPLOAD_LENGTH, length
        )));
    }
    Ok(length)
}

/// Parse the offset the client believes is current. Must be a non-negative integer.
pub fn parse_upload_offset(headers: &HeaderMap) -> Result<i64, AppError> {
    let raw = headers
        .get(UPLOAD_OFFSET)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::InvalidInput(format!("Missing {} header", UPLOAD_OFFSET))
        })?;
    let offset: i64 = raw.parse().map_err(|_| {
        AppError::InvalidInput(format!("Invalid {} header: {}", UPLOAD_OFFSET, raw))
    })?;
    if offset < 0 {
        return Err(AppError::InvalidInput(format!(
            "{} must be non-negative, got {}",
            UPLOAD_OFFSET, offset
        )));
    }
    Ok(offset)
}

/// Parse `upload-metadata`: comma-separated `key base64(value)` pairs. Keys
/// without a value are allowed and map to the empty string.
pub fn parse_upload_metadata(headers: &HeaderMap) -> Result<HashMap<String, String>, AppError> {
    let mut metadata = HashMap::new();

    let Some(raw) = headers.get(UPLOAD_METADATA).and_then(|v| v.to_str().ok()) else {
        return Ok(metadata);
    };

    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let mut parts = pair.splitn(2, ' ');
        let key = parts.next().unwrap_or_default();
        if key.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Invalid {} pair: {}",
                UPLOAD_METADATA, pair
            )));
        }
        let value = match parts.next() {
            Some(encoded) => {
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|_| {
                        AppError::InvalidInput(format!(
                            "Invalid base64 in {} value for key {}",
                            UPLOAD_METADATA, key
                        ))
                    })?;
                String::from_utf8(decoded).map_err(|_| {
                    AppError::InvalidInput(format!(
                        "Non-UTF-8 {} value for key {}",
                        UPLOAD_METADATA, key
                    ))
                })?
            }
            None => String::new(),
        };
        metadata.insert(key.to_string(), value);
    }

    Ok(metadata)
}

/// Validate the client-chosen upload id: 1-64 chars of `[A-Za-z0-9_-]`.
/// Keeps ids usable as storage keys without path games.
pub fn validate_upload_id(id: &str) -> Result<(), AppError> {
    if id.is_empty() || id.len() > 64 {
        return Err(AppError::InvalidInput(
            "Upload id must be 1-64 characters".to_string(),
        ));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::InvalidInput(
            "Upload id may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_version_accepted() {
        let h = headers(&[(TUS_RESUMABLE, "1.0.0")]);
        assert!(require_supported_version(&h).is_ok());
    }

    #[test]
    fn test_version_missing_or_wrong_rejected() {
        let h = headers(&[]);
        assert!(matches!(
            require_supported_version(&h),
            Err(AppError::UnsupportedTusVersion(_))
        ));

        let h = headers(&[(TUS_RESUMABLE, "0.2.2")]);
        match require_supported_version(&h) {
            Err(AppError::UnsupportedTusVersion(v)) => assert_eq!(v, "0.2.2"),
            other => panic!("expected UnsupportedTusVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_upload_length() {
        let h = headers(&[(UPLOAD_LENGTH, "1024")]);
        assert_eq!(parse_upload_length(&h).unwrap(), 1024);
    }

    #[test]
    fn test_parse_upload_length_rejects_zero_and_garbage() {
        let h = headers(&[(UPLOAD_LENGTH, "0")]);
        assert!(matches!(
            parse_upload_length(&h),
            Err(AppError::InvalidInput(_))
        ));

        let h = headers(&[(UPLOAD_LENGTH, "ten")]);
        assert!(matches!(
            parse_upload_length(&h),
            Err(AppError::InvalidInput(_))
        ));

        let h = headers(&[]);
        assert!(matches!(
            parse_upload_length(&h),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_upload_offset() {
        let h = headers(&[(UPLOAD_OFFSET, "0")]);
        assert_eq!(parse_upload_offset(&h).unwrap(), 0);

        let h = headers(&[(UPLOAD_OFFSET, "512")]);
        assert_eq!(parse_upload_offset(&h).unwrap(), 512);

        let h = headers(&[(UPLOAD_OFFSET, "-1")]);
        assert!(matches!(
            parse_upload_offset(&h),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_upload_metadata_decodes_filename() {
        // "filename cG90aG9sZS5qcGc=" -> pothole.jpg
        let h = headers(&[(UPLOAD_METADATA, "filename cG90aG9sZS5qcGc=")]);
        let metadata = parse_upload_metadata(&h).unwrap();
        assert_eq!(metadata.get("filename").unwrap(), "pothole.jpg");
    }

    #[test]
    fn test_parse_upload_metadata_multiple_pairs_and_bare_keys() {
        let h = headers(&[(
            UPLOAD_METADATA,
            "filename cG90aG9sZS5qcGc=, is_confidential",
        )]);
        let metadata = parse_upload_metadata(&h).unwrap();
        assert_eq!(metadata.get("filename").unwrap(), "pothole.jpg");
        assert_eq!(metadata.get("is_confidential").unwrap(), "");
    }

    #[test]
    fn test_parse_upload_metadata_invalid_base64_rejected() {
        let h = headers(&[(UPLOAD_METADATA, "filename !!notbase64!!")]);
        assert!(matches!(
            parse_upload_metadata(&h),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_upload_metadata_absent_is_empty() {
        let h = headers(&[]);
        assert!(parse_upload_metadata(&h).unwrap().is_empty());
    }

    #[test]
    fn test_validate_upload_id() {
        assert!(validate_upload_id("photo-123_abc").is_ok());
        assert!(validate_upload_id("").is_err());
        assert!(validate_upload_id(&"x".repeat(65)).is_err());
        assert!(validate_upload_id("../etc/passwd").is_err());
        assert!(validate_upload_id("a b").is_err());
    }
}
