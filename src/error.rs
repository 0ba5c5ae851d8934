use thiserror::Error;

/// Why a characteristic payload could not be decoded.
///
/// Decode errors are never fatal. A caller should treat one as "no reading this cycle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The characteristic value had no bytes at all
    #[error("payload is empty")]
    EmptyPayload,
    /// The flags announce more fields than the payload carries
    #[error("payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort { expected: usize, actual: usize },
}

/// Return `payload` if it holds at least `len` bytes.
pub(crate) fn require(payload: &[u8], len: usize) -> Result<&[u8], DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    if payload.len() < len {
        return Err(DecodeError::PayloadTooShort {
            expected: len,
            actual: payload.len(),
        });
    }
    Ok(payload)
}

#[test]
fn test_require_empty() {
    assert_eq!(require(&[], 1), Err(DecodeError::EmptyPayload));
}

#[test]
fn test_require_short() {
    assert_eq!(
        require(&[0x01, 0x02], 3),
        Err(DecodeError::PayloadTooShort { expected: 3, actual: 2 })
    );
}

#[test]
fn test_display() {
    let err = DecodeError::PayloadTooShort { expected: 2, actual: 1 };
    assert_eq!(err.to_string(), "payload too short: expected at least 2 bytes, got 1");
}
