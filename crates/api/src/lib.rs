//! HTTP API for the marketplace order core.
//!
//! Exposes the order transaction coordinator and the package issuer over
//! REST, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use checkout::{OrderCoordinator, PackageIssuer};
use metrics_exporter_prometheus::PrometheusHandle;
use store::DocumentStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/orders/{id}/status",
            patch(routes::orders::update_status::<S>),
        )
        .route(
            "/orders/{id}/packages",
            post(routes::packages::create_from_order::<S>),
        )
        .route(
            "/packages/{id}/use",
            post(routes::packages::use_package::<S>),
        )
        .route(
            "/packages/process-expired",
            post(routes::packages::process_expired::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state: the coordinator and issuer wired to one
/// store instance at startup.
pub fn create_state<S: DocumentStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        coordinator: OrderCoordinator::new(store.clone()),
        issuer: PackageIssuer::new(store.clone()),
        store,
    })
}
