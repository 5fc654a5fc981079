//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The relay routes (`/upload`, `/message`) and the liveness probe (`/`)
//! - Application state wiring the relay service into handlers
//! - JSON error responses

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use shareflow_core::relay::{FileStore, RelayService, SheetLog};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
pub struct AppState<F: FileStore, L: SheetLog> {
    /// Relay service over the storage and log clients.
    pub relay: Arc<RelayService<F, L>>,
    /// Maximum accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

impl<F: FileStore, L: SheetLog> Clone for AppState<F, L> {
    fn clone(&self) -> Self {
        Self {
            relay: self.relay.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

impl<F: FileStore, L: SheetLog> AppState<F, L> {
    /// Creates state around a relay service.
    #[must_use]
    pub fn new(relay: RelayService<F, L>, max_upload_bytes: usize) -> Self {
        Self {
            relay: Arc::new(relay),
            max_upload_bytes,
        }
    }
}

/// Creates the main application router.
pub fn create_router<F, L>(state: AppState<F, L>) -> Router
where
    F: FileStore + 'static,
    L: SheetLog + 'static,
{
    Router::new()
        .merge(routes::relay_routes(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
