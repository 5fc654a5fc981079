//! Liveness probe.

use axum::{Router, routing::get};

/// Fixed liveness payload.
pub const LIVENESS_MESSAGE: &str = "ShareFlow backend is running ✅";

/// GET `/`
async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Creates the liveness route.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(liveness))
}
