//! Error types for percept-eye

use thiserror::Error;

/// Failures local to one inbound message. None of these are fatal to the
/// process; the pipeline logs, drops the message and continues.
#[derive(Error, Debug)]
pub enum VisionError {
    /// Malformed or unsupported payload, base64 or image bytes.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The external detector capability failed on this frame.
    #[error("Detection error: {0}")]
    Detection(String),

    /// Annotated-frame re-encoding failed.
    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VisionError {
    pub fn is_decode(&self) -> bool {
        matches!(self, VisionError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VisionError::Decode("bad base64".to_string());
        assert!(err.to_string().contains("Decode error"));
        assert!(err.to_string().contains("bad base64"));
        assert!(err.is_decode());
        assert!(!VisionError::Detection("x".to_string()).is_decode());
    }
}
