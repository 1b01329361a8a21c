pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;

use shield_dashboard_domain::health::create_default_health_service;
use shield_dashboard_domain::services::{create_default_scoring_service, ScoringClientError};

use crate::config::AppConfig;
use state::AppState;

/// Create the application router wired to the real scoring backend
pub fn create_application(config: AppConfig) -> Result<Router, ScoringClientError> {
    let scoring = create_default_scoring_service(config.api.clone())?;
    let health = create_default_health_service(scoring.clone());
    Ok(routes::create_app(AppState::new(config, scoring, health)))
}
