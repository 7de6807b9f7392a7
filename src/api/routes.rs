use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main router: root and health endpoints, item endpoints under
/// the configured API prefix, and static images.
pub fn create_router(state: AppState) -> Router {
    let api_prefix = state.config.api_prefix.clone();
    let images = ServeDir::new(&state.config.images_dir);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .nest(&api_prefix, item_routes())
        .nest_service("/images", images)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Item endpoints, mounted under the API prefix
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(handlers::list_items))
        .route("/items/:item_id", get(handlers::get_item_details))
        .route("/items/:item_id/related", get(handlers::get_related_items))
}
