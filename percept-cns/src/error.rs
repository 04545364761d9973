//! Error types for percept-cns

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CnsError {
    /// Transport-level send/subscribe failure on one channel.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Payload error: {0}")]
    Payload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<rumqttc::ClientError> for CnsError {
    fn from(err: rumqttc::ClientError) -> Self {
        CnsError::Transport(err.to_string())
    }
}
