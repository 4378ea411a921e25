pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/documents/resume",
            post(handlers::handle_generate_resume),
        )
        .route(
            "/api/v1/documents/cover-letter",
            post(handlers::handle_generate_cover_letter),
        )
        .with_state(state)
}
