// Handler tests drive the full router with mock services

mod score_api_test;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};

use shield_dashboard_domain::health::HealthServiceTrait;
use shield_dashboard_domain::testing::{MockHealthService, MockScoringService};

use crate::api::routes::create_app;
use crate::api::state::AppState;
use crate::config::AppConfig;

// Body size limit used when reading responses
pub(super) const BODY_SIZE_LIMIT: usize = 1024 * 1024;

pub(super) const BOUNDARY: &str = "shield-test-boundary";

/// Router backed by the given scoring mock and a healthy health mock
pub(super) fn test_app(scoring: Arc<MockScoringService>) -> Router {
    test_app_with_health(scoring, Arc::new(MockHealthService::new()))
}

pub(super) fn test_app_with_health(scoring: Arc<MockScoringService>, health: Arc<dyn HealthServiceTrait>) -> Router {
    test_app_with_config(scoring, health, test_config())
}

pub(super) fn test_app_with_config(
    scoring: Arc<MockScoringService>,
    health: Arc<dyn HealthServiceTrait>,
    config: AppConfig,
) -> Router {
    create_app(AppState::new(config, scoring, health))
}

pub(super) fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None).unwrap()
}

pub(super) async fn body_string(response: Response<Body>) -> String {
    let body = to_bytes(response.into_body(), BODY_SIZE_LIMIT).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// The `name=value` pair of the session cookie set on a response
pub(super) fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set the session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

pub(super) fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// URL-encoded dashboard form post; values here never need escaping
pub(super) fn form_post(cookie: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Multipart lab report post with a single `file` part
pub(super) fn upload_post(cookie: Option<&str>, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/lab-report")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY));
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// The values from the dashboard's healthy-sleeper scenario
pub(super) fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("age", "45"),
        ("sex", "male"),
        ("total_sleep_hours", "7.5"),
        ("sleep_efficiency", "90"),
        ("REM_percentage", "22"),
        ("sleep_latency", "15"),
        ("hrv", "60"),
        ("timing_consistency", "0.5"),
        ("chronotype_alignment", "true"),
    ]
}
