//! Upload session byte accounting.
//!
//! The transition rules for one resumable upload, independent of transport and
//! persistence. `PhotoRepository` evaluates these rules inside its transactions;
//! the protocol adapter never reimplements them.

use crate::error::AppError;

/// Byte-accounting state of one upload session.
///
/// Invariant: `0 <= received_offset <= declared_length`. A session is complete
/// when the two are equal; completion is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTransition {
    pub declared_length: i64,
    pub received_offset: i64,
}

impl UploadTransition {
    /// Validate session creation. Creation carries the full payload in one shot,
    /// so the initial byte count must equal the declared length exactly.
    pub fn create(declared_length: i64, initial_len: i64) -> Result<Self, AppError> {
        if declared_length <= 0 {
            return Err(AppError::InvalidInput(format!(
                "upload-length must be a positive integer, got {}",
                declared_length
            )));
        }
        if initial_len != declared_length {
            return Err(AppError::InvalidLength {
                declared: declared_length,
                received: initial_len,
            });
        }
        Ok(Self {
            declared_length,
            received_offset: initial_len,
        })
    }

    /// Validate an append and return the state after it. The client-declared
    /// offset must equal the current one (out-of-order and duplicate chunks are
    /// rejected, not queued), and the chunk must fit in the declared length.
    pub fn append(&self, client_offset: i64, chunk_len: i64) -> Result<Self, AppError> {
        if chunk_len < 0 {
            return Err(AppError::InvalidInput(format!(
                "chunk length must be non-negative, got {}",
                chunk_len
            )));
        }
        if client_offset != self.received_offset {
            return Err(AppError::OffsetMismatch {
                client: client_offset,
                server: self.received_offset,
            });
        }
        if self.received_offset + chunk_len > self.declared_length {
            return Err(AppError::UploadOverflow {
                offset: self.received_offset,
                chunk: chunk_len,
                declared: self.declared_length,
            });
        }
        Ok(Self {
            declared_length: self.declared_length,
            received_offset: self.received_offset + chunk_len,
        })
    }

    /// Whether every declared byte has been received.
    pub fn is_complete(&self) -> bool {
        self.received_offset == self.declared_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(declared: i64, offset: i64) -> UploadTransition {
        UploadTransition {
            declared_length: declared,
            received_offset: offset,
        }
    }

    #[test]
    fn test_create_full_payload() {
        let state = UploadTransition::create(100, 100).unwrap();
        assert_eq!(state.received_offset, 100);
        assert_eq!(state.declared_length, 100);
        assert!(state.is_complete());
    }

    #[test]
    fn test_create_partial_payload_rejected() {
        let err = UploadTransition::create(100, 50).unwrap_err();
        match err {
            AppError::InvalidLength { declared, received } => {
                assert_eq!(declared, 100);
                assert_eq!(received, 50);
            }
            other => panic!("expected InvalidLength, got {:?}", other),
        }
    }

    #[test]
    fn test_create_zero_or_negative_length_rejected() {
        assert!(matches!(
            UploadTransition::create(0, 0),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            UploadTransition::create(-5, -5),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_append_continuity_sums_chunk_lengths() {
        let mut state = session(100, 0);
        for chunk in [30, 20, 50] {
            state = state.append(state.received_offset, chunk).unwrap();
        }
        assert_eq!(state.received_offset, 100);
        assert!(state.is_complete());
    }

    #[test]
    fn test_append_wrong_offset_leaves_state_unchanged() {
        let state = session(100, 30);
        let err = state.append(50, 50).unwrap_err();
        match err {
            AppError::OffsetMismatch { client, server } => {
                assert_eq!(client, 50);
                assert_eq!(server, 30);
            }
            other => panic!("expected OffsetMismatch, got {:?}", other),
        }
        // the failed append returns by value; the original is untouched
        assert_eq!(state.received_offset, 30);
    }

    #[test]
    fn test_append_duplicate_chunk_rejected() {
        let state = session(100, 40);
        // replaying the previous chunk declares the old offset
        assert!(matches!(
            state.append(20, 20),
            Err(AppError::OffsetMismatch { .. })
        ));
    }

    #[test]
    fn test_append_overflow_leaves_state_unchanged() {
        let state = session(100, 80);
        let err = state.append(80, 40).unwrap_err();
        match err {
            AppError::UploadOverflow {
                offset,
                chunk,
                declared,
            } => {
                assert_eq!(offset, 80);
                assert_eq!(chunk, 40);
                assert_eq!(declared, 100);
            }
            other => panic!("expected UploadOverflow, got {:?}", other),
        }
        assert_eq!(state.received_offset, 80);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_append_exactly_to_declared_length() {
        let state = session(100, 80);
        let state = state.append(80, 20).unwrap();
        assert_eq!(state.received_offset, 100);
        assert!(state.is_complete());
    }

    #[test]
    fn test_empty_chunk_at_correct_offset_is_a_noop() {
        let state = session(100, 60);
        let state = state.append(60, 0).unwrap();
        assert_eq!(state.received_offset, 60);
    }

    #[test]
    fn test_offset_is_monotonically_non_decreasing() {
        let mut state = session(1000, 0);
        let mut previous = 0;
        for chunk in [100, 0, 250, 650] {
            state = state.append(state.received_offset, chunk).unwrap();
            assert!(state.received_offset >= previous);
            previous = state.received_offset;
        }
        assert!(state.is_complete());
    }
}
