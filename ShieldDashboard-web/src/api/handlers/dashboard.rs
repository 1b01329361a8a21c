use std::collections::HashMap;

use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};

use shield_dashboard_domain::page::{FlowError, SubmitRejection};

use crate::api::state::AppState;
use crate::pages::dashboard::render_dashboard;

/// Show the dashboard with whatever the session last had on screen
#[instrument(skip(state, headers))]
pub async fn show_dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let handle = state.sessions.resolve(&headers).await;
    let session = state.sessions.snapshot(handle.id).await;

    handle.attach_cookie(Html(render_dashboard(&session.dashboard, None)).into_response())
}

/// Accept the dashboard form and score it.
///
/// Invalid input is re-rendered with inline errors and never reaches the
/// backend. A second submission while one is outstanding gets a 409.
#[instrument(skip(state, headers, fields))]
pub async fn submit_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let handle = state.sessions.resolve(&headers).await;
    let id = handle.id;

    let started = state
        .sessions
        .update(id, |session| session.dashboard.begin_submission(&fields))
        .await;

    let (ticket, input) = match started {
        Ok(started) => started,
        Err(SubmitRejection::InFlight) => {
            warn!("Refused dashboard submission while one is in progress");
            let session = state.sessions.snapshot(id).await;
            let notice = FlowError::InFlight.to_string();
            let page = render_dashboard(&session.dashboard, Some(&notice));
            return handle.attach_cookie((StatusCode::CONFLICT, Html(page)).into_response());
        }
        Err(SubmitRejection::Invalid(errors)) => {
            info!("Dashboard submission has {} invalid fields", errors.len());
            let session = state.sessions.snapshot(id).await;
            let page = render_dashboard(&session.dashboard, None);
            return handle.attach_cookie((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    info!("Submitting dashboard metrics for scoring");

    // Runs to completion even if the browser goes away, so the flow never sticks
    let scoring = state.scoring.clone();
    let sessions = state.sessions.clone();
    let task = tokio::spawn(async move {
        let outcome = scoring.submit_sleep_score(&input).await;
        sessions
            .update(id, |session| match outcome {
                Ok(score) => {
                    session.dashboard.score.succeed(ticket, score);
                }
                Err(e) => {
                    session.dashboard.score.fail(ticket, e.user_message());
                }
            })
            .await;
    });

    let status = match task.await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            error!("Scoring task failed: {}", e);
            state
                .sessions
                .update(id, |session| {
                    session.dashboard.score.fail(ticket, "An unexpected error occurred");
                })
                .await;
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let session = state.sessions.snapshot(id).await;
    handle.attach_cookie((status, Html(render_dashboard(&session.dashboard, None))).into_response())
}
