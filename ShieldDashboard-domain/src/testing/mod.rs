// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::entities::lab::{Biomarker, BiomarkerReport, LabUpload};
use crate::entities::sleep::{Alert, BreakdownValue, Metric, MetricBreakdown, ScoreResponse, SleepMetricsInput};
use crate::health::{overall_status, ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::services::scoring::{BackendCall, ScoringClientError, ScoringServiceTrait};

/// How the mock backend should fail
#[derive(Debug, Clone, PartialEq)]
pub enum MockFailure {
    /// Non-success status with an optional detail
    Backend { status: u16, detail: Option<String> },
    /// Connection could not be made
    Transport,
    /// No answer within the timeout
    Timeout,
    /// Answered with an undecodable body
    Malformed,
}

impl MockFailure {
    fn to_error(&self, call: BackendCall) -> ScoringClientError {
        match self {
            MockFailure::Backend { status, detail } => ScoringClientError::Backend {
                call,
                status: *status,
                detail: detail.clone(),
            },
            MockFailure::Transport => ScoringClientError::Transport("connection refused".to_string()),
            MockFailure::Timeout => ScoringClientError::Timeout(Duration::from_secs(60)),
            MockFailure::Malformed => ScoringClientError::MalformedResponse("expected value".to_string()),
        }
    }
}

/// A score shaped like the backend's answer for a healthy sleeper
pub fn sample_score_response() -> ScoreResponse {
    let breakdown = Metric::DISPLAY_ORDER
        .into_iter()
        .map(|metric| {
            let (value, optimal, impact) = match metric {
                Metric::Hrv => (BreakdownValue::Number(60.0), ">50 ms", -0.2),
                Metric::TotalSleepHours => (BreakdownValue::Number(7.5), "7-9 h", -0.1),
                Metric::SleepEfficiency => (BreakdownValue::Number(90.0), ">85%", -0.1),
                Metric::RemPercentage => (BreakdownValue::Number(22.0), "20-25%", 0.0),
                Metric::SleepLatency => (BreakdownValue::Number(15.0), "10-20 min", 0.0),
                Metric::TimingConsistency => (BreakdownValue::Number(0.5), "<1 h", 0.1),
                Metric::ChronotypeAlignment => (BreakdownValue::Flag(true), "true", -0.1),
            };
            (
                metric.key().to_string(),
                MetricBreakdown {
                    value,
                    optimal: optimal.to_string(),
                    impact,
                    label: None,
                    help: None,
                },
            )
        })
        .collect();

    ScoreResponse {
        shield_score: 82.0,
        bio_age_delta: -1.5,
        alerts: vec![Alert::new("Low REM sleep")],
        breakdown,
    }
}

/// A lab report with two extracted biomarkers
pub fn sample_biomarker_report() -> BiomarkerReport {
    let biomarkers = [
        (
            "Hemoglobin",
            Biomarker {
                value: 13.2,
                unit: "g/dL".to_string(),
                ref_low: Some(13.0),
                ref_high: Some(17.0),
                status: "IN RANGE".to_string(),
            },
        ),
        (
            "Glucose, Fasting",
            Biomarker {
                value: 92.0,
                unit: "mg/dL".to_string(),
                ref_low: Some(70.0),
                ref_high: Some(100.0),
                status: "IN RANGE".to_string(),
            },
        ),
    ]
    .into_iter()
    .map(|(name, marker)| (name.to_string(), marker))
    .collect();

    BiomarkerReport {
        filename: Some("labs.pdf".to_string()),
        biomarkers,
        suggestions: Some("Keep up your current routine.".to_string()),
        message: Some("File received securely. Biomarker extraction complete.".to_string()),
    }
}

/// Mock implementation of the ScoringServiceTrait for testing
pub struct MockScoringService {
    score: ScoreResponse,
    report: BiomarkerReport,
    failure: Option<MockFailure>,
    backend_up: bool,
    delay: Option<Duration>,
    score_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    last_input: Mutex<Option<SleepMetricsInput>>,
}

impl Default for MockScoringService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScoringService {
    /// Create a mock that answers every call successfully
    pub fn new() -> Self {
        Self {
            score: sample_score_response(),
            report: sample_biomarker_report(),
            failure: None,
            backend_up: true,
            delay: None,
            score_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    /// Answer score submissions with this response
    pub fn with_score(mut self, score: ScoreResponse) -> Self {
        self.score = score;
        self
    }

    /// Answer uploads with this report
    pub fn with_report(mut self, report: BiomarkerReport) -> Self {
        self.report = report;
        self
    }

    /// Fail every backend call this way
    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Configure the health probe to fail
    pub fn with_backend_down(mut self) -> Self {
        self.backend_up = false;
        self
    }

    /// Wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of score requests that reached the backend
    pub fn score_calls(&self) -> usize {
        self.score_calls.load(Ordering::SeqCst)
    }

    /// Number of uploads that reached the backend
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// The most recent input sent for scoring
    pub async fn last_input(&self) -> Option<SleepMetricsInput> {
        self.last_input.lock().await.clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ScoringServiceTrait for MockScoringService {
    async fn submit_sleep_score(&self, input: &SleepMetricsInput) -> Result<ScoreResponse, ScoringClientError> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().await = Some(input.clone());
        self.pause().await;

        match &self.failure {
            Some(failure) => Err(failure.to_error(BackendCall::SleepScore)),
            None => Ok(self.score.clone()),
        }
    }

    async fn upload_lab_report(&self, upload: LabUpload) -> Result<BiomarkerReport, ScoringClientError> {
        // Same local checks as the HTTP client; these never count as calls
        if !upload.is_pdf() {
            return Err(ScoringClientError::UnsupportedFileType(upload.file_name));
        }
        if upload.bytes.is_empty() {
            return Err(ScoringClientError::EmptyUpload(upload.file_name));
        }

        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        match &self.failure {
            Some(failure) => Err(failure.to_error(BackendCall::LabUpload)),
            None => Ok(BiomarkerReport {
                filename: Some(upload.file_name),
                ..self.report.clone()
            }),
        }
    }

    async fn check_backend_status(&self) -> Result<bool, String> {
        if self.backend_up {
            Ok(true)
        } else {
            Err("Scoring backend unreachable: connection refused".to_string())
        }
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    /// Scoring backend component status
    backend_status: ComponentStatus,
    /// Additional components
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            backend_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with a degraded scoring backend
    pub fn with_degraded_backend(mut self) -> Self {
        self.backend_status = ComponentStatus::Degraded;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );
        components.insert(
            "scoring_backend".to_string(),
            HealthComponent {
                status: self.backend_status.clone(),
                details: match self.backend_status {
                    ComponentStatus::Healthy => None,
                    _ => Some("Scoring backend unreachable".to_string()),
                },
            },
        );

        for (name, component) in &self.components {
            components.insert(name.clone(), component.clone());
        }

        SystemHealth {
            status: overall_status(&components),
            components,
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
