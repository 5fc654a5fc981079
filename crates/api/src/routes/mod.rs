//! API route definitions.

use std::future::Future;

use axum::Router;
use shareflow_core::relay::{FileStore, RelayError, SheetLog};
use shareflow_shared::AppError;
use tracing::{debug, error};

use crate::{AppState, error::ApiError};

pub mod health;
pub mod message;
pub mod upload;

/// Creates the router with the liveness probe and both relay endpoints.
pub fn relay_routes<F, L>(max_upload_bytes: usize) -> Router<AppState<F, L>>
where
    F: FileStore + 'static,
    L: SheetLog + 'static,
{
    Router::new()
        .merge(health::routes())
        .merge(upload::routes(max_upload_bytes))
        .merge(message::routes())
}

/// Runs a relay call on its own task.
///
/// The call completes even if the client disconnects and the handler is
/// dropped; failures are logged from inside the task.
async fn run_detached<T, Fut>(operation: &'static str, call: Fut) -> Result<T, ApiError>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T, RelayError>> + Send + 'static,
{
    let task = tokio::spawn(async move {
        let result = call.await;
        if let Err(e) = &result {
            report(e, operation);
        }
        result
    });

    match task.await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            error!(operation, error = %e, "Relay task did not complete");
            Err(AppError::Internal("Internal server error".to_string()).into())
        }
    }
}

/// Logs a failed relay operation at a level matching its cause.
fn report(err: &RelayError, operation: &'static str) {
    match err {
        RelayError::NoFileUploaded | RelayError::EmptyMessage => {
            debug!(operation, reason = %err, "Rejected relay request");
        }
        RelayError::Store(source) => {
            error!(
                operation,
                kind = source.kind(),
                status = ?source.status(),
                error = %source,
                "Storage call failed"
            );
        }
        RelayError::Orphaned { file_ref, source } => {
            error!(
                operation,
                file_id = file_ref.as_ref().map_or("<none>", |r| r.as_str()),
                kind = source.kind(),
                status = ?source.status(),
                error = %source,
                "File stored but log append failed; stored file has no log row"
            );
        }
        RelayError::Log(source) => {
            error!(
                operation,
                kind = source.kind(),
                status = ?source.status(),
                error = %source,
                "Log append failed"
            );
        }
    }
}
