//! Relay error types.

use shareflow_shared::AppError;
use thiserror::Error;

use super::types::StoredFileRef;

/// Failure of a single remote call.
///
/// `Display` is the upstream message verbatim; it is what callers see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never produced an HTTP response.
    #[error("{message}")]
    Network {
        /// Transport error text.
        message: String,
    },

    /// The credential was rejected or lacks permission.
    #[error("{message}")]
    Unauthorized {
        /// HTTP status (401 or 403).
        status: u16,
        /// Upstream error text.
        message: String,
    },

    /// Target folder, spreadsheet or range does not exist.
    #[error("{message}")]
    NotFound {
        /// Upstream error text.
        message: String,
    },

    /// Rate limit or quota exhausted.
    #[error("{message}")]
    Quota {
        /// HTTP status (429 or 403).
        status: u16,
        /// Upstream error text.
        message: String,
    },

    /// Any other non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Upstream error text.
        message: String,
    },

    /// A success response whose body could not be understood.
    #[error("{message}")]
    Decode {
        /// Parse error text.
        message: String,
    },

    /// No access token could be obtained.
    #[error("{message}")]
    Auth {
        /// Token endpoint error text.
        message: String,
    },
}

impl RemoteError {
    /// Classifies a failed HTTP response.
    ///
    /// `reason` is the provider's machine-readable reason, when available.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>, reason: Option<&str>) -> Self {
        let message = message.into();
        let quota_reason = reason.is_some_and(|r| {
            matches!(
                r,
                "rateLimitExceeded"
                    | "userRateLimitExceeded"
                    | "quotaExceeded"
                    | "storageQuotaExceeded"
                    | "dailyLimitExceeded"
                    | "RATE_LIMIT_EXCEEDED"
                    | "RESOURCE_EXHAUSTED"
            )
        });

        match status {
            429 => Self::Quota { status, message },
            403 if quota_reason => Self::Quota { status, message },
            401 | 403 => Self::Unauthorized { status, message },
            404 => Self::NotFound { message },
            _ => Self::Api { status, message },
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an auth error.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::Quota { .. } => "quota",
            Self::Api { .. } => "api",
            Self::Decode { .. } => "decode",
            Self::Auth { .. } => "auth",
        }
    }

    /// HTTP status of the upstream response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. }
            | Self::Quota { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Network { .. } | Self::Decode { .. } | Self::Auth { .. } => None,
        }
    }
}

/// Relay operation errors.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Upload request carried no file part.
    #[error("No file uploaded")]
    NoFileUploaded,

    /// Message request carried no usable text.
    #[error("Message is empty")]
    EmptyMessage,

    /// The storage call failed; nothing was written.
    #[error("{0}")]
    Store(#[source] RemoteError),

    /// The log append failed; nothing was written.
    #[error("{0}")]
    Log(#[source] RemoteError),

    /// The file was stored but its log append failed.
    ///
    /// `file_ref` is `None` when storage returned no identifier.
    #[error("{source}")]
    Orphaned {
        /// File stored without a row.
        file_ref: Option<StoredFileRef>,
        /// Append failure.
        source: RemoteError,
    },
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::NoFileUploaded | RelayError::EmptyMessage => {
                Self::Validation(err.to_string())
            }
            RelayError::Store(_) | RelayError::Log(_) | RelayError::Orphaned { .. } => {
                Self::ExternalService(err.to_string())
            }
        }
    }
}
