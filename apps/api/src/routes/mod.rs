pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and the small text fields next to the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/status", get(handlers::handle_status))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/resume",
            post(handlers::handle_upload_resume),
        )
        .route(
            "/api/v1/sessions/:id/editor",
            put(handlers::handle_update_editor),
        )
        .route(
            "/api/v1/sessions/:id/submission",
            post(handlers::handle_submit_code),
        )
        .route(
            "/api/v1/sessions/:id/navigate",
            post(handlers::handle_navigate),
        )
        .route(
            "/api/v1/sessions/:id/restart",
            post(handlers::handle_restart),
        )
        .route(
            "/api/v1/sessions/:id/feedback",
            get(handlers::handle_feedback_markdown),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
