//! Application-wide error types.

use thiserror::Error;

/// Application error types.
///
/// The inner string is the client-facing message; `Display` adds a category
/// prefix for server-side logs.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client input failed a precondition.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request body exceeds the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A remote service call failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error; the message is safe to show to clients.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::ExternalService(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for structured logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::PayloadTooLarge(msg)
            | Self::ExternalService(msg)
            | Self::Internal(msg) => msg,
        }
    }
}
