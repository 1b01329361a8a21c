use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::api::handlers::{self, health};
use crate::api::state::AppState;
use crate::openapi;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    let max_body = state.config.max_upload_bytes;

    // Server-rendered pages
    let page_routes = Router::new()
        .route("/", get(handlers::show_dashboard).post(handlers::submit_dashboard))
        .route(
            "/lab-report",
            get(handlers::show_lab_report).post(handlers::upload_lab_report),
        );

    debug!("Page routes configured");

    // JSON API
    let api_routes = Router::new().route("/sleep-score", post(handlers::score_sleep));

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json));

    debug!("Public routes configured");

    let app = Router::new()
        .merge(page_routes)
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .fallback(handlers::redirect_home)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    debug!("Routes merged");

    // Initialize health check service startup time
    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}
