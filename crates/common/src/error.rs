use thiserror::Error;

/// Common error types used across the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Notification queue closed")]
    QueueClosed,
}

impl RelayError {
    /// True for a rejected or expired bearer credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RelayError::Status { status: 401, .. })
    }
}
