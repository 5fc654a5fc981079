//! Message route.

use axum::{Json, Router, extract::State, routing::post};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use shareflow_core::relay::{FileStore, SheetLog};
use tracing::info;

use crate::{AppState, error::ApiError};

/// Creates the message route.
pub fn routes<F, L>() -> Router<AppState<F, L>>
where
    F: FileStore + 'static,
    L: SheetLog + 'static,
{
    Router::new().route("/message", post(record_message::<F, L>))
}

/// Incoming message body. Anything but a JSON string counts as absent.
#[derive(Debug, Default, Deserialize)]
pub struct MessageRequest {
    /// Raw `message` value.
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl MessageRequest {
    /// Parses a request body, treating malformed JSON as an empty request.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Returns the text when `message` is a JSON string.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self.message {
            Some(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }
}

/// Response for a recorded message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Always true.
    pub success: bool,
}

/// POST `/message`
async fn record_message<F, L>(
    State(state): State<AppState<F, L>>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError>
where
    F: FileStore + 'static,
    L: SheetLog + 'static,
{
    let text = MessageRequest::parse(&body).into_text();

    let relay = state.relay.clone();
    super::run_detached("message", async move { relay.record_message(text).await }).await?;

    info!("Message logged");
    Ok(Json(MessageResponse { success: true }))
}
