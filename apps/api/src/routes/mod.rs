pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::builder::handlers;
use crate::state::AppState;

/// Transport ceiling for request bodies. Kept above the 10 MiB file limit so
/// oversized uploads reach file validation and get its message.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/upload", post(handlers::handle_upload))
        .route("/api/v1/sessions/:id/analyze", post(handlers::handle_analyze))
        .route("/api/v1/sessions/:id/step", put(handlers::handle_set_step))
        .route(
            "/api/v1/sessions/:id/template",
            put(handlers::handle_select_template),
        )
        .route(
            "/api/v1/sessions/:id/customization",
            patch(handlers::handle_update_customization),
        )
        .route(
            "/api/v1/sessions/:id/profile",
            put(handlers::handle_replace_profile).patch(handlers::handle_edit_profile),
        )
        .route("/api/v1/sessions/:id/enhance", post(handlers::handle_enhance))
        .route("/api/v1/sessions/:id/preview", get(handlers::handle_preview))
        .route("/api/v1/sessions/:id/reset", post(handlers::handle_reset))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
