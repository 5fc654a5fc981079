//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shareflow_core::relay::RelayError;
use shareflow_shared::AppError;
use tracing::debug;

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

/// Error returned by handlers, rendered as `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        debug!(code = self.0.error_code(), status = status.as_u16(), "Sending error response");
        let body = ErrorResponse {
            error: self.0.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use shareflow_core::relay::RemoteError;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let (status, body) = render(RelayError::NoFileUploaded.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "No file uploaded" }));
    }

    #[tokio::test]
    async fn test_upstream_error_relays_message() {
        let err = RelayError::Store(RemoteError::from_status(
            403,
            "The user does not have sufficient permissions for this file.",
            Some("insufficientFilePermissions"),
        ));
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({
                "error": "The user does not have sufficient permissions for this file."
            })
        );
    }

    #[tokio::test]
    async fn test_payload_too_large() {
        let (status, body) =
            render(AppError::PayloadTooLarge("File too large".into()).into()).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "File too large");
    }

    #[tokio::test]
    async fn test_internal_error_body() {
        let (status, body) =
            render(AppError::Internal("Internal server error".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    }
}
