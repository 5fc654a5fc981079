//! Mapping of Google API responses onto `RemoteError`.

use reqwest::{Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use shareflow_core::relay::RemoteError;

use crate::error::ClientError;

/// Standard Google API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    /// gRPC-style status, e.g. `PERMISSION_DENIED`.
    #[serde(default)]
    status: Option<String>,
    /// Legacy per-error details carrying `reason`.
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

/// Builds the error for a non-success response.
pub(crate) async fn remote_error(response: Response) -> RemoteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let (message, reason) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => {
            let reason = envelope
                .error
                .errors
                .into_iter()
                .find_map(|d| d.reason)
                .or(envelope.error.status);
            (envelope.error.message, reason)
        }
        Err(_) => (body.trim().to_string(), None),
    };

    let message = if message.is_empty() {
        format!("Request failed with status code {}", status.as_u16())
    } else {
        message
    };

    RemoteError::from_status(status.as_u16(), message, reason.as_deref())
}

/// Maps a transport failure.
pub(crate) fn transport_error(err: &reqwest::Error) -> RemoteError {
    RemoteError::network(err.to_string())
}

/// Decodes a success body, or classifies the failure.
pub(crate) async fn json_or_error<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    if !response.status().is_success() {
        return Err(remote_error(response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::decode(e.to_string()))
}

/// Parses a configured API root.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw).map_err(|e| ClientError::invalid_url(raw, e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::invalid_url(raw, "not a base url"));
    }
    Ok(url)
}

/// Appends path segments to an API root.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
