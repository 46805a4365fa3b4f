//! Sync client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Errors talking to the hosted remote store
#[derive(Debug, Error)]
pub enum SyncError {
    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request (rules or credentials)
    #[error("Permission denied by the remote store")]
    PermissionDenied,

    /// The store is unreachable or answered with a server error
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// The request exceeded its time budget
    #[error("Remote request timed out")]
    Timeout,

    /// Unexpected response shape or status
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Classify an HTTP status into the small remote-failure code set.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            Self::PermissionDenied
        } else if status.is_server_error() {
            Self::Unavailable(status.to_string())
        } else {
            Self::InvalidResponse(format!("unexpected status {status}"))
        }
    }

    /// Message shown to the customer when this failure surfaces.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "The order server rejected the request",
            Self::Timeout => "The order server took too long to respond",
            Self::Http(_) | Self::Unavailable(_) => "Could not reach the order server",
            Self::InvalidResponse(_) | Self::Serialization(_) => {
                "The order server gave an unexpected answer"
            }
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        let code = match &err {
            SyncError::PermissionDenied => ErrorCode::RemotePermissionDenied,
            SyncError::Timeout => ErrorCode::RemoteTimeout,
            _ => ErrorCode::RemoteUnavailable,
        };
        AppError::with_message(code, err.user_message()).with_detail("cause", err.to_string())
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
