use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handlers::{
    create_api_router, handle_panic, health_check, metrics_handler, route_not_found,
};
use crate::observability::{observability_middleware, MenuOperationTracer, Metrics};
use crate::services::MenuService;

/// Assemble the full application: menu API, health and metrics endpoints, the 404
/// fallback, panic recovery and the request pipeline middleware.
pub fn create_app(
    menu_service: Arc<MenuService>,
    metrics: Arc<Metrics>,
    max_request_size: usize,
) -> Router {
    let metrics_for_middleware = metrics.clone();
    let tracer = MenuOperationTracer::new(metrics.clone());

    Router::new()
        .route("/health", get(health_check).fallback(route_not_found))
        .route("/metrics", get(metrics_handler).fallback(route_not_found))
        .with_state(metrics)
        .merge(create_api_router(menu_service, tracer))
        .fallback(route_not_found)
        // Layers run outer to inner from the bottom up
        .layer(CatchPanicLayer::custom(handle_panic))
        // The Json extractor applies its own 2 MB cap to the already buffered body;
        // align it with the configured limit so larger settings take effect
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), max_request_size, req, next)
        }))
}
