use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};

use shield_dashboard_domain::entities::{ScoreResponse, SleepMetricsInput};
use shield_dashboard_domain::services::validate_metrics;

use crate::api::state::AppState;
use crate::entities::common::PublicErrorResponse;

/// Score one set of sleep metrics
#[utoipa::path(
    post,
    path = "/api/v1/sleep-score",
    request_body = SleepMetricsInput,
    responses(
        (status = 200, description = "Sleep metrics scored", body = ScoreResponse),
        (status = 400, description = "Invalid sleep metrics", body = PublicErrorResponse),
        (status = 502, description = "Scoring backend failed", body = PublicErrorResponse),
        (status = 504, description = "Scoring backend timed out", body = PublicErrorResponse),
    ),
    tag = "sleep_score"
)]
#[instrument(skip(state, payload))]
pub async fn score_sleep(
    State(state): State<AppState>,
    payload: Result<Json<SleepMetricsInput>, JsonRejection>,
) -> Result<impl IntoResponse, Response> {
    let Json(input) = payload.map_err(|rejection| {
        warn!("Rejected sleep score payload: {}", rejection.body_text());
        PublicErrorResponse::validation_error(&rejection.body_text(), None).into_response()
    })?;

    if let Err(errors) = validate_metrics(&input) {
        warn!("Invalid sleep metrics: {}", errors);
        return Err(PublicErrorResponse::field_errors(&errors).into_response());
    }

    info!("Scoring sleep metrics via API");

    match state.scoring.submit_sleep_score(&input).await {
        Ok(score) => Ok((StatusCode::OK, Json(score))),
        Err(e) => {
            error!("Sleep scoring failed: {}", e);
            Err(PublicErrorResponse::from_scoring_error(&e).into_response())
        }
    }
}
