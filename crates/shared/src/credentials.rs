//! Service-account credential loading.
//!
//! Credentials come from one of two sources, tried in order:
//! 1. `GOOGLE_APPLICATION_CREDENTIALS_B64`, a base64-encoded JSON key
//! 2. A JSON key file on disk
//!
//! Any failure here is fatal at startup.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the base64-encoded key.
pub const CREDENTIALS_B64_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS_B64";

/// Environment variable naming the key file.
pub const CREDENTIALS_PATH_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Errors raised while loading a service-account key.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Neither source is available.
    #[error(
        "no credentials found: set GOOGLE_APPLICATION_CREDENTIALS_B64 or provide a key file at {}",
        .path.display()
    )]
    Missing {
        /// File path that was checked.
        path: PathBuf,
    },

    /// The inline value is not valid base64.
    #[error("GOOGLE_APPLICATION_CREDENTIALS_B64 is not valid base64: {0}")]
    Base64(String),

    /// The key file could not be read.
    #[error("failed to read credential file {}: {message}", .path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error text.
        message: String,
    },

    /// The decoded content is not a service-account JSON key.
    #[error("invalid service account JSON: {0}")]
    Json(String),
}

/// Where the key is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Base64-encoded JSON held in memory.
    Inline(String),
    /// JSON file on disk.
    File(PathBuf),
}

impl CredentialSource {
    /// Picks a source: a non-blank inline value wins, then an existing file.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Missing` if neither is available.
    pub fn resolve(inline: Option<String>, path: &Path) -> Result<Self, CredentialError> {
        if let Some(value) = inline.filter(|v| !v.trim().is_empty()) {
            return Ok(Self::Inline(value));
        }

        if path.is_file() {
            return Ok(Self::File(path.to_path_buf()));
        }

        Err(CredentialError::Missing {
            path: path.to_path_buf(),
        })
    }

    /// Resolves the source from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Missing` if neither source is available.
    pub fn from_env(path: &Path) -> Result<Self, CredentialError> {
        Self::resolve(std::env::var(CREDENTIALS_B64_ENV).ok(), path)
    }

    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Inline(_) => "env",
            Self::File(_) => "file",
        }
    }

    /// Reads and parses the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be decoded or parsed.
    pub fn load(&self) -> Result<ServiceAccountKey, CredentialError> {
        let raw = match self {
            Self::Inline(encoded) => {
                // Env values are often wrapped across lines.
                let compact: String = encoded.split_whitespace().collect();
                STANDARD
                    .decode(compact)
                    .map_err(|e| CredentialError::Base64(e.to_string()))?
            }
            Self::File(path) => std::fs::read(path).map_err(|e| CredentialError::Io {
                path: path.clone(),
                message: e.to_string(),
            })?,
        };

        ServiceAccountKey::from_json(&raw)
    }
}

/// Google service-account key, as downloaded from the cloud console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account identity (JWT issuer).
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Key id, sent as the JWT `kid` header when present.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Owning project.
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[hidden]")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parses a key from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Json` if required fields are missing or blank.
    pub fn from_json(raw: &[u8]) -> Result<Self, CredentialError> {
        let key: Self =
            serde_json::from_slice(raw).map_err(|e| CredentialError::Json(e.to_string()))?;

        if key.client_email.trim().is_empty() {
            return Err(CredentialError::Json("client_email is empty".to_string()));
        }
        if key.private_key.trim().is_empty() {
            return Err(CredentialError::Json("private_key is empty".to_string()));
        }

        Ok(key)
    }
}
