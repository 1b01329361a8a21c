use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        State,
    },
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};

use shield_dashboard_domain::entities::LabUpload;

use crate::api::state::{AppState, SessionHandle};
use crate::pages::lab_report::render_lab_report;

/// Name of the multipart field carrying the report
const FILE_FIELD: &str = "file";

#[instrument(skip(state, headers))]
pub async fn show_lab_report(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let handle = state.sessions.resolve(&headers).await;
    let session = state.sessions.snapshot(handle.id).await;

    handle.attach_cookie(Html(render_lab_report(&session.lab, None)).into_response())
}

/// Accept a lab report upload and forward it for biomarker extraction
#[instrument(skip(state, headers, multipart))]
pub async fn upload_lab_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let handle = state.sessions.resolve(&headers).await;
    let id = handle.id;

    let upload = match read_upload(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            warn!("Lab upload without a file");
            return render_notice(&state, handle, StatusCode::BAD_REQUEST, "Please select a PDF file.").await;
        }
        Err((status, message)) => {
            warn!("Could not read lab upload: {}", message);
            return render_notice(&state, handle, status, &message).await;
        }
    };

    let started = state
        .sessions
        .update(id, |session| session.lab.begin_upload(&upload.file_name))
        .await;

    let ticket = match started {
        Ok(ticket) => ticket,
        Err(e) => {
            warn!("Refused lab upload while one is in progress");
            return render_notice(&state, handle, StatusCode::CONFLICT, &e.to_string()).await;
        }
    };

    info!("Uploading lab report {}", upload.file_name);

    let scoring = state.scoring.clone();
    let sessions = state.sessions.clone();
    let task = tokio::spawn(async move {
        let outcome = scoring.upload_lab_report(upload).await;
        sessions
            .update(id, |session| match outcome {
                Ok(report) => {
                    session.lab.report.succeed(ticket, report);
                    StatusCode::OK
                }
                // Refused before leaving the server, like a missing file
                Err(e) if e.is_rejected_input() => {
                    warn!("Lab upload refused: {}", e);
                    session.lab.report.fail(ticket, e.user_message());
                    StatusCode::BAD_REQUEST
                }
                Err(e) => {
                    session.lab.report.fail(ticket, e.user_message());
                    StatusCode::OK
                }
            })
            .await
    });

    let status = match task.await {
        Ok(status) => status,
        Err(e) => {
            error!("Lab upload task failed: {}", e);
            state
                .sessions
                .update(id, |session| {
                    session.lab.report.fail(ticket, "An unexpected error occurred");
                })
                .await;
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let session = state.sessions.snapshot(id).await;
    handle.attach_cookie((status, Html(render_lab_report(&session.lab, None))).into_response())
}

/// Pull the `file` field out of the form; other fields are ignored
async fn read_upload(mut multipart: Multipart) -> Result<Option<LabUpload>, (StatusCode, String)> {
    let reject = |e: MultipartError| (e.status(), e.body_text());

    while let Some(field) = multipart.next_field().await.map_err(reject)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(reject)?;

        // Browsers send an empty, unnamed part when nothing was chosen
        if file_name.is_empty() && bytes.is_empty() {
            return Ok(None);
        }

        return Ok(Some(LabUpload::new(file_name, content_type, bytes.to_vec())));
    }
    Ok(None)
}

async fn render_notice(state: &AppState, handle: SessionHandle, status: StatusCode, notice: &str) -> Response {
    let session = state.sessions.snapshot(handle.id).await;
    let page = render_lab_report(&session.lab, Some(notice));
    handle.attach_cookie((status, Html(page)).into_response())
}
