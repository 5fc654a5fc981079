//! Client construction errors.

use thiserror::Error;

/// Errors raised while building the Google clients at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service-account private key is not a usable RSA key.
    #[error("invalid service account private key: {0}")]
    InvalidKey(String),

    /// A configured API root is not a valid base URL.
    #[error("invalid base url '{url}': {message}")]
    InvalidUrl {
        /// The configured value.
        url: String,
        /// Parse error text.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Http(String),
}

impl ClientError {
    /// Create an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}
