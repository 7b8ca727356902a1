//! HTTP router.
//!
//! Middleware stack (outermost → innermost):
//! 1. Access log (all routes) → 2. Extension(ApiContext) → 3. API key check
//!    (protected routes) → 4. Body limit → handler

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>`; handlers use `State<ApiContext>`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    let body_limit = ctx
        .core
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/upload_prescription", post(endpoints::prescriptions::upload))
        .route(
            "/get_patient_data/:patient_id",
            get(endpoints::prescriptions::get_patient_data),
        )
        .with_state(ctx.clone())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::auth::require_api_key))
        // Extension must be outside the key check so it can read ApiContext
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
}
