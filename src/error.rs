//! Error types for rosgate
//!
//! Provides a unified error type for all operations. Callers that need to
//! branch (retry, HTTP status) should match on [`RosgateError::kind`] rather than on
//! message text.

use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, RosgateError>;

/// Unified error type for rosgate operations
#[derive(Debug, Error)]
pub enum RosgateError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("connection error: {0}")]
    Connection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Device Errors
    // -------------------------------------------------------------------------
    #[error("login failed: {0}")]
    Authentication(String),

    #[error("RouterOS error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("command not allowed: {0}")]
    SafetyPolicy(String),

    #[error("malformed request: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of an [`RosgateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Authentication,
    Protocol,
    Validation,
    SafetyPolicy,
}

impl RosgateError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RosgateError::Connection(_) | RosgateError::Io(_) => ErrorKind::Connection,
            RosgateError::Authentication(_) => ErrorKind::Authentication,
            RosgateError::Protocol(_) => ErrorKind::Protocol,
            RosgateError::Validation(_) | RosgateError::Serialization(_) => ErrorKind::Validation,
            RosgateError::SafetyPolicy(_) => ErrorKind::SafetyPolicy,
        }
    }

    /// HTTP status the collaborator layer should answer with
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Authentication => 401,
            ErrorKind::SafetyPolicy => 403,
            ErrorKind::Connection | ErrorKind::Protocol => 502,
        }
    }

    /// Map a socket error into the connection kind, naming timeouts explicitly
    pub(crate) fn from_io(context: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                RosgateError::Connection(format!("{context}: timed out"))
            }
            _ => RosgateError::Connection(format!("{context}: {err}")),
        }
    }
}
