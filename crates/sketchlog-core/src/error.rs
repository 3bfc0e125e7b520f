//! Error types.

use thiserror::Error;

/// Coordinate transform precondition violations.
///
/// These indicate the caller tried to dispatch or capture before a usable
/// surface size was known; the affected call is aborted rather than sent
/// malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("capture frame has zero width or height")]
    ZeroCaptureFrame,
    #[error("surface has zero size or zero screen scale")]
    ZeroSurface,
}

/// Failures reported by a rendering surface when a command is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The surface is not mounted yet. The command may be retried later.
    #[error("surface is not mounted")]
    NotMounted,
    /// The surface refused the command.
    #[error("surface rejected command: {0}")]
    Rejected(String),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by an editing session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
