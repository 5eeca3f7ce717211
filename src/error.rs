//! Error handling for the dashboard core

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backend answered outside the success range
    #[error("Gateway error: {status} {status_text}")]
    Gateway { status: u16, status_text: String },

    /// Request could not be sent or the response could not be decoded
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Live stream resource failed to load (local, per display slot)
    #[error("Stream unavailable for camera {0}")]
    StreamUnavailable(i64),
}

impl Error {
    /// HTTP status code, if this is a gateway error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Gateway { status, .. } => Some(*status),
            _ => None,
        }
    }
}
