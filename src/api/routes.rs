use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    routes,
};

use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/recommend", get(routes::recommendations::recommend))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Library CRUD under /api
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Books
        .route(
            "/books",
            get(routes::books::list).post(routes::books::create),
        )
        .route("/books/:id", delete(routes::books::delete))
        // Authors
        .route(
            "/authors",
            get(routes::authors::list).post(routes::authors::create),
        )
        .route("/authors/:id", delete(routes::authors::delete))
}
