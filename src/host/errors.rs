//! Host collaborator errors

use thiserror::Error;

pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    /// Transport-level failure (connection, timeout, TLS)
    #[error("host unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The host answered with a non-success status
    #[error("host rejected request with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The requested document does not exist
    #[error("document {0} not found")]
    NotFound(u64),

    /// The host answered with a body the client could not interpret
    #[error("could not decode host response: {0}")]
    Decode(String),
}

impl HostError {
    /// Stable error code for the tool-facing surface.
    pub fn code(&self) -> &'static str {
        match self {
            HostError::Http(_) => "SMITH_HOST_UNAVAILABLE",
            HostError::Status { .. } => "SMITH_HOST_REJECTED",
            HostError::NotFound(_) => "SMITH_DOCUMENT_NOT_FOUND",
            HostError::Decode(_) => "SMITH_HOST_DECODE",
        }
    }
}
