#[cfg(test)]
mod score_api_tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use shield_dashboard_domain::testing::{MockFailure, MockScoringService};

    use super::super::{body_string, get, test_app};

    fn valid_payload() -> Value {
        json!({
            "total_sleep_hours": 7.5,
            "sleep_efficiency": 90.0,
            "REM_percentage": 22.0,
            "age": 45,
            "sex": "male",
            "sleep_latency": 15.0,
            "hrv": 60.0,
            "timing_consistency": 0.5,
            "chronotype_alignment": true
        })
    }

    fn score_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/sleep-score")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::http::Response<Body>) -> Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_score_api_returns_backend_score() {
        let mock = Arc::new(MockScoringService::new());
        let app = test_app(mock.clone());

        let response = app.oneshot(score_request(valid_payload().to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["shield_score"], 82.0);
        assert_eq!(body["bio_age_delta"], -1.5);
        assert_eq!(body["breakdown"].as_object().unwrap().len(), 7);
        assert_eq!(mock.score_calls(), 1);
    }

    #[tokio::test]
    async fn test_score_api_rejects_out_of_range_metrics() {
        let mock = Arc::new(MockScoringService::new());
        let app = test_app(mock.clone());

        let mut payload = valid_payload();
        payload["hrv"] = json!(0.0);

        let response = app.oneshot(score_request(payload.to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"]["hrv"], "HRV must be greater than 0 and at most 300");
        assert_eq!(mock.score_calls(), 0);
    }

    #[tokio::test]
    async fn test_score_api_rejects_malformed_json() {
        let mock = Arc::new(MockScoringService::new());
        let app = test_app(mock.clone());

        let response = app.oneshot(score_request("{\"age\": ".to_string())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "validation_error");
        assert_eq!(mock.score_calls(), 0);
    }

    #[tokio::test]
    async fn test_score_api_maps_backend_failures() {
        let cases = [
            (MockFailure::Timeout, StatusCode::GATEWAY_TIMEOUT, "backend_timeout"),
            (
                MockFailure::Backend { status: 500, detail: None },
                StatusCode::BAD_GATEWAY,
                "backend_error",
            ),
            (MockFailure::Transport, StatusCode::BAD_GATEWAY, "backend_error"),
        ];

        for (failure, status, code) in cases {
            let app = test_app(Arc::new(MockScoringService::new().with_failure(failure)));

            let response = app.oneshot(score_request(valid_payload().to_string())).await.unwrap();

            assert_eq!(response.status(), status);
            assert_eq!(json_body(response).await["error"], code);
        }
    }

    #[tokio::test]
    async fn test_backend_failure_without_detail_uses_fallback_message() {
        let app = test_app(Arc::new(
            MockScoringService::new().with_failure(MockFailure::Backend { status: 500, detail: None }),
        ));

        let response = app.oneshot(score_request(valid_payload().to_string())).await.unwrap();

        assert_eq!(json_body(response).await["message"], "Failed to submit sleep score.");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = test_app(Arc::new(MockScoringService::new()));

        let response = app.oneshot(get("/api-docs/openapi.json", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["info"]["title"], "SHIELD Dashboard API");
        assert!(body["paths"]["/api/v1/sleep-score"].is_object());
    }
}
