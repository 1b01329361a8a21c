use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::config::ApiConfig;
use crate::entities::lab::{BiomarkerReport, LabUpload};
use crate::entities::sleep::{ScoreResponse, SleepMetricsInput};

/// Longest wait for the health probe, regardless of the call timeout
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Which backend call produced a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    SleepScore,
    LabUpload,
}

impl BackendCall {
    /// Shown when the backend fails without saying why
    pub fn fallback_message(self) -> &'static str {
        match self {
            BackendCall::SleepScore => "Failed to submit sleep score.",
            BackendCall::LabUpload => "Failed to upload lab report.",
        }
    }
}

/// Scoring client errors
#[derive(Debug, Error)]
pub enum ScoringClientError {
    /// The selected file is not a PDF
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The selected file has no content
    #[error("Empty upload: {0}")]
    EmptyUpload(String),

    /// The backend could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// No response within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-success status
    #[error("Backend returned status {status}")]
    Backend {
        call: BackendCall,
        status: u16,
        detail: Option<String>,
    },

    /// The backend answered with a body that could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ScoringClientError {
    /// The single message shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            ScoringClientError::UnsupportedFileType(_) => "Please select a PDF file.".to_string(),
            ScoringClientError::EmptyUpload(_) => "The selected file is empty.".to_string(),
            ScoringClientError::Transport(_) => {
                "Could not reach the scoring service. Please check your connection and try again.".to_string()
            }
            ScoringClientError::Timeout(_) => {
                "The scoring service took too long to respond. Please try again.".to_string()
            }
            ScoringClientError::Backend { call, detail, .. } => detail
                .clone()
                .unwrap_or_else(|| call.fallback_message().to_string()),
            ScoringClientError::MalformedResponse(_) => {
                "The scoring service returned an unexpected response.".to_string()
            }
        }
    }

    /// Whether the failure was caused by the input rather than the backend
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            ScoringClientError::UnsupportedFileType(_) | ScoringClientError::EmptyUpload(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ScoringClientError::Timeout(_))
    }
}

/// Trait for the remote scoring backend
#[async_trait]
pub trait ScoringServiceTrait: Send + Sync {
    /// Submit one validated metrics input for scoring
    async fn submit_sleep_score(&self, input: &SleepMetricsInput) -> Result<ScoreResponse, ScoringClientError>;

    /// Upload a lab report PDF for biomarker extraction
    async fn upload_lab_report(&self, upload: LabUpload) -> Result<BiomarkerReport, ScoringClientError>;

    /// Check whether the backend answers
    /// `Ok(false)` when it answers with a server error; `Err` when it cannot be reached
    async fn check_backend_status(&self) -> Result<bool, String>;
}

/// HTTP client for the scoring backend
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    client: Client,
    config: ApiConfig,
}

impl HttpScoringClient {
    pub fn new(config: ApiConfig) -> Result<Self, ScoringClientError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ScoringClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ScoringClientError {
        if err.is_timeout() {
            warn!("Scoring backend timed out after {:?}", self.config.timeout());
            ScoringClientError::Timeout(self.config.timeout())
        } else {
            error!("Failed to reach scoring backend: {}", err);
            ScoringClientError::Transport(err.to_string())
        }
    }

    /// Turn a backend response into a decoded body or a uniform error
    async fn read_response<T: DeserializeOwned>(
        &self,
        call: BackendCall,
        response: Response,
    ) -> Result<T, ScoringClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let detail = extract_detail(&body);
            warn!(
                "Scoring backend returned {} for {:?}: {}",
                status,
                call,
                detail.as_deref().unwrap_or("no detail")
            );
            return Err(ScoringClientError::Backend {
                call,
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("Could not decode {:?} response: {}", call, e);
            ScoringClientError::MalformedResponse(e.to_string())
        })
    }
}

#[async_trait]
impl ScoringServiceTrait for HttpScoringClient {
    #[instrument(skip(self, input))]
    async fn submit_sleep_score(&self, input: &SleepMetricsInput) -> Result<ScoreResponse, ScoringClientError> {
        info!("Submitting sleep metrics to {}", self.config.score_url());

        let response = self
            .client
            .post(self.config.score_url().clone())
            .json(input)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let score: ScoreResponse = self.read_response(BackendCall::SleepScore, response).await?;
        info!(
            "Received SHIELD score {} with {} breakdown entries",
            score.shield_score,
            score.breakdown.len()
        );
        Ok(score)
    }

    #[instrument(skip(self, upload), fields(file_name = %upload.file_name))]
    async fn upload_lab_report(&self, upload: LabUpload) -> Result<BiomarkerReport, ScoringClientError> {
        if !upload.is_pdf() {
            warn!("Rejected non-PDF upload {:?}", upload.content_type);
            return Err(ScoringClientError::UnsupportedFileType(upload.file_name));
        }
        if upload.bytes.is_empty() {
            warn!("Rejected empty upload");
            return Err(ScoringClientError::EmptyUpload(upload.file_name));
        }

        info!(
            "Uploading lab report ({} bytes) to {}",
            upload.bytes.len(),
            self.config.lab_upload_url()
        );

        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(mime::APPLICATION_PDF.as_ref())
            .map_err(|e| self.map_transport_error(e))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.config.lab_upload_url().clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let report: BiomarkerReport = self.read_response(BackendCall::LabUpload, response).await?;
        info!("Received {} biomarkers", report.biomarkers.len());
        Ok(report)
    }

    async fn check_backend_status(&self) -> Result<bool, String> {
        // A client error still means the backend answered; a server error means it is sick
        match self
            .client
            .get(self.config.base_url().clone())
            .timeout(PROBE_TIMEOUT.min(self.config.timeout()))
            .send()
            .await
        {
            Ok(response) if response.status().is_server_error() => {
                warn!("Scoring backend probe answered {}", response.status());
                Ok(false)
            }
            Ok(_) => Ok(true),
            Err(e) if e.is_timeout() => Err("Scoring backend did not respond in time".to_string()),
            Err(e) => Err(format!("Scoring backend unreachable: {}", e)),
        }
    }
}

/// Pull the user-facing `detail` out of an error body.
///
/// A string is used as is; a list of validation objects is flattened into
/// their `msg` texts joined with "; ".
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.as_str()),
                    other => other.get("msg").and_then(Value::as_str),
                })
                .filter(|msg| !msg.trim().is_empty())
                .collect();

            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

/// Create the default scoring service
pub fn create_default_scoring_service(
    config: ApiConfig,
) -> Result<Arc<dyn ScoringServiceTrait>, ScoringClientError> {
    Ok(Arc::new(HttpScoringClient::new(config)?))
}

/// Create a mock scoring service for testing
/// This function is only available when the mock feature is enabled
#[cfg(feature = "mock")]
pub fn create_mock_scoring_service() -> Arc<dyn ScoringServiceTrait> {
    Arc::new(crate::testing::MockScoringService::new())
}
