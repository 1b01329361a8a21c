use axum::Json;
use utoipa::OpenApi;

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Scoring endpoints
        crate::api::handlers::score_api::score_sleep
    ),
    components(
        schemas(
            // Entities
            crate::entities::common::PublicErrorResponse,
            shield_dashboard_domain::entities::SleepMetricsInput,
            shield_dashboard_domain::entities::ScoreResponse,
            shield_dashboard_domain::entities::Sex,
            shield_dashboard_domain::entities::Biomarker,
            shield_dashboard_domain::entities::BiomarkerReport,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "sleep_score", description = "SHIELD sleep scoring endpoints")
    ),
    info(
        title = "SHIELD Dashboard API",
        version = "0.1.0",
        description = "Sleep metric scoring and lab report dashboard",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "SHIELD Dashboard API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "health"));
        assert!(tags.iter().any(|tag| tag.name == "sleep_score"));

        assert!(openapi.paths.paths.contains_key("/health"));
        assert!(openapi.paths.paths.contains_key("/api/v1/sleep-score"));

        let schemas = &openapi.components.as_ref().unwrap().schemas;
        assert!(schemas.contains_key("SleepMetricsInput"));
        assert!(schemas.contains_key("PublicErrorResponse"));
    }
}
