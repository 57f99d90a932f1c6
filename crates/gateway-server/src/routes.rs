//! Route definitions for the front-end services.

use axum::{
    routing::{get, post},
    Router,
};
use gateway_config::ServiceKind;

use crate::{handlers, middleware, state::AppState};

/// Create the router for the configured service
pub fn create_router(state: AppState) -> Router {
    let service_routes = match state.config.service {
        ServiceKind::Quiz => quiz_routes(),
        ServiceKind::Material => material_routes(),
    };

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(service_routes)
        // Apply middleware (last added runs first)
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::cors_layer())
        .with_state(state)
}

/// Quiz generator routes
fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generate_quiz))
        .route(
            "/generate_quiz_and_assignments",
            post(handlers::generate_quiz_and_assignments),
        )
}

/// Material generator routes
fn material_routes() -> Router<AppState> {
    Router::new().route("/generate_material", post(handlers::generate_material))
}
