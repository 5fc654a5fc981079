//! File upload route.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use shareflow_core::relay::{FileStore, SheetLog, StoredFileRef, UploadedFile};
use shareflow_shared::AppError;
use tracing::{info, warn};

use crate::{AppState, error::ApiError};

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Creates the upload route with its body limit.
pub fn routes<F, L>(max_upload_bytes: usize) -> Router<AppState<F, L>>
where
    F: FileStore + 'static,
    L: SheetLog + 'static,
{
    Router::new().route(
        "/upload",
        post(upload_file::<F, L>).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}

/// Response for a relayed upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always true.
    pub success: bool,
    /// Reference of the stored file, omitted when storage returned none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<StoredFileRef>,
}

/// POST `/upload`
/// Store the `file` part, then log it.
async fn upload_file<F, L>(
    State(state): State<AppState<F, L>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError>
where
    F: FileStore + 'static,
    L: SheetLog + 'static,
{
    let file = read_file_part(multipart).await?;

    let relay = state.relay.clone();
    let file_id = super::run_detached("upload", async move { relay.upload(file).await }).await?;

    info!(file_id = ?file_id.as_ref().map(StoredFileRef::as_str), "File stored and logged");
    Ok(Json(UploadResponse {
        success: true,
        file_id,
    }))
}

/// Reads the first `file` part that carries a filename.
///
/// A request that is not multipart at all yields `None`.
async fn read_file_part(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<UploadedFile>, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Ok(None);
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Parts without a filename are plain form values, not files.
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(UploadedFile::new(name, content_type, data)));
    }

    Ok(None)
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, "Upload exceeds body limit");
        return AppError::PayloadTooLarge("File too large".to_string()).into();
    }

    warn!(error = %err, "Malformed multipart body");
    AppError::Validation(err.body_text()).into()
}
