use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Once;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, instrument};
use utoipa::ToSchema;

use shield_dashboard_domain::health::{ComponentStatus as DomainComponentStatus, HealthComponent, SystemStatus};

use crate::api::state::AppState;

/// Health check response model with system information
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Details about various components of the system
    pub components: ComponentStatus,
    /// Environment information
    pub environment: String,
}

/// Status of individual system components
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// Dashboard server status
    pub api: ComponentHealthStatus,
    /// Scoring backend reachability
    pub scoring_backend: ComponentHealthStatus,
    /// Additional components (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<serde_json::Value>,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Option<&HealthComponent>> for ComponentHealthStatus {
    fn from(component: Option<&HealthComponent>) -> Self {
        Self {
            status: map_component_status(component.map(|c| &c.status).unwrap_or(&DomainComponentStatus::Healthy)),
            message: component.and_then(|c| c.details.clone()),
        }
    }
}

// Track the time when the server started using a thread-safe OnceCell
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

// Initialize the server start time
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let _ = SERVER_START_TIME.set(unix_now());
    });
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint reporting the dashboard and its scoring backend
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Service is not healthy", body = HealthResponse),
        (status = 503, description = "Service is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let now = unix_now();
    let uptime = SERVER_START_TIME.get().map(|&start_time| now.saturating_sub(start_time));

    let system_health = state.health.get_system_health().await;

    let overall_status = match system_health.status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    };

    let additional: serde_json::Map<String, serde_json::Value> = system_health
        .components
        .iter()
        .filter(|(name, _)| name.as_str() != "api" && name.as_str() != "scoring_backend")
        .map(|(name, component)| {
            (
                name.clone(),
                serde_json::json!({
                    "status": map_component_status(&component.status),
                    "message": component.details,
                }),
            )
        })
        .collect();

    let components = ComponentStatus {
        api: system_health.components.get("api").into(),
        scoring_backend: system_health.components.get("scoring_backend").into(),
        additional: (!additional.is_empty()).then(|| additional.into()),
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components,
        environment: state.config.environment.clone(),
    };

    let status = match system_health.status {
        SystemStatus::Healthy => StatusCode::OK,
        SystemStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        SystemStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(response))
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}
