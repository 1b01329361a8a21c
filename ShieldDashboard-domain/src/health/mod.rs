//! Domain layer health check functionality
//! Reports whether the dashboard and its scoring backend are usable

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::services::scoring::ScoringServiceTrait;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;
}

/// Health service that probes the scoring backend
pub struct BackendHealthService {
    scoring: Arc<dyn ScoringServiceTrait>,
}

impl BackendHealthService {
    pub fn new(scoring: Arc<dyn ScoringServiceTrait>) -> Self {
        Self { scoring }
    }
}

#[async_trait]
impl HealthServiceTrait for BackendHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let backend_component = match self.scoring.check_backend_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Scoring backend responded but reported problems".to_string()),
            },
            // The dashboard still renders without the backend, so this only degrades
            Err(e) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some(e),
            },
        };

        let api_component = HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        };

        let components: HashMap<String, HealthComponent> = [
            ("api".to_string(), api_component),
            ("scoring_backend".to_string(), backend_component),
        ]
        .into_iter()
        .collect();

        SystemHealth {
            status: overall_status(&components),
            components,
        }
    }
}

/// Worst component status wins
pub fn overall_status(components: &HashMap<String, HealthComponent>) -> SystemStatus {
    if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
        SystemStatus::Unhealthy
    } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
        SystemStatus::Degraded
    } else {
        SystemStatus::Healthy
    }
}

/// Create the default health service
pub fn create_default_health_service(scoring: Arc<dyn ScoringServiceTrait>) -> Arc<dyn HealthServiceTrait> {
    Arc::new(BackendHealthService::new(scoring))
}
