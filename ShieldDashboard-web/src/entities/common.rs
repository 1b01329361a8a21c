use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use shield_dashboard_domain::forms::FieldErrors;
use shield_dashboard_domain::services::ScoringClientError;

/// Standardized error response format
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional details about the error, e.g. per-field messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PublicErrorResponse {
    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// One message per invalid field, keyed by wire name
    pub fn field_errors(errors: &FieldErrors) -> Self {
        Self::validation_error(
            "Invalid sleep metrics",
            serde_json::to_value(errors.to_map()).ok(),
        )
    }

    /// Map a scoring backend failure
    pub fn from_scoring_error(err: &ScoringClientError) -> Self {
        let error = if err.is_timeout() {
            "backend_timeout"
        } else if err.is_rejected_input() {
            "bad_request"
        } else {
            "backend_error"
        };

        Self {
            error: error.to_string(),
            message: err.user_message(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "backend_error" => StatusCode::BAD_GATEWAY,
            "backend_timeout" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PublicErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
