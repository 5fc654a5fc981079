//! OAuth2 access tokens for a service account.
//!
//! Tokens are obtained with the JWT bearer grant: an RS256 assertion signed
//! with the service-account key is exchanged at the key's `token_uri`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use shareflow_core::relay::RemoteError;
use shareflow_shared::ServiceAccountKey;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ClientError;
use crate::response::transport_error;

/// Full Drive access.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Full Sheets access.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion (Google's maximum).
const ASSERTION_TTL_SECS: i64 = 3600;

/// Tokens this close to expiry are refreshed.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the bearer assertion.
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECS
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Access-token source scoped to a service account.
pub struct ServiceAccountAuth {
    http: reqwest::Client,
    client_email: String,
    token_uri: String,
    scope: String,
    header: Header,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("scope", &self.scope)
            .field("encoding_key", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl ServiceAccountAuth {
    /// Creates a token source for `scopes`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidKey` if the private key is not a PEM RSA key.
    pub fn new(
        key: &ServiceAccountKey,
        scopes: &[&str],
        http: reqwest::Client,
    ) -> Result<Self, ClientError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| ClientError::InvalidKey(e.to_string()))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&key.private_key_id);

        Ok(Self {
            http,
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            scope: scopes.join(" "),
            header,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// Returns a valid access token, fetching a new one when needed.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Auth` if the token endpoint rejects the
    /// assertion, or a network/decode error.
    pub async fn access_token(&self) -> Result<String, RemoteError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = self.fetch(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, RemoteError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_TTL_SECS,
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| RemoteError::auth(format!("failed to sign assertion: {e}")))
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<CachedToken, RemoteError> {
        let assertion = self.assertion(now)?;

        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {description}", err.error),
                    None => err.error,
                },
                Err(_) => format!("token request failed with status code {}", status.as_u16()),
            };
            return Err(RemoteError::auth(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::decode(e.to_string()))?;

        debug!(
            client_email = %self.client_email,
            expires_in = token.expires_in,
            "Obtained access token"
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
