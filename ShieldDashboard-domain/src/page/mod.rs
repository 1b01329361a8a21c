//! Per-session page state
//!
//! Each page owns one [`ActionFlow`] that tracks its outstanding request,
//! last error and last result. Results are swapped in on success and
//! cleared on failure; a previous result stays visible while a new request
//! is outstanding.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::entities::lab::BiomarkerReport;
use crate::entities::sleep::{ScoreResponse, SleepMetricsInput};
use crate::forms::{FieldErrors, SleepForm};

/// Where a flow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Identifies one submission; completions carrying an old ticket are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowTicket(u64);

/// Flow errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("A submission is already in progress")]
    InFlight,
}

/// Request lifecycle for one action on one page
#[derive(Debug, Clone)]
pub struct ActionFlow<T> {
    phase: FlowPhase,
    generation: u64,
    result: Option<T>,
    error: Option<String>,
}

impl<T> Default for ActionFlow<T> {
    fn default() -> Self {
        Self {
            phase: FlowPhase::Idle,
            generation: 0,
            result: None,
            error: None,
        }
    }
}

impl<T> ActionFlow<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Whether the submit control should be disabled
    pub fn is_busy(&self) -> bool {
        self.phase == FlowPhase::Submitting
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a submission. The previous result stays until it completes.
    pub fn begin(&mut self) -> Result<FlowTicket, FlowError> {
        if self.is_busy() {
            return Err(FlowError::InFlight);
        }
        self.generation += 1;
        self.phase = FlowPhase::Submitting;
        self.error = None;
        Ok(FlowTicket(self.generation))
    }

    /// Record a successful completion. Returns false for a stale ticket.
    pub fn succeed(&mut self, ticket: FlowTicket, value: T) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.phase = FlowPhase::Succeeded;
        self.result = Some(value);
        self.error = None;
        true
    }

    /// Record a failed completion. Returns false for a stale ticket.
    pub fn fail(&mut self, ticket: FlowTicket, message: impl Into<String>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.phase = FlowPhase::Failed;
        self.result = None;
        self.error = Some(message.into());
        true
    }

    /// An input changed; clears the last error unless a request is outstanding
    pub fn edit(&mut self) {
        if self.is_busy() {
            return;
        }
        self.phase = FlowPhase::Idle;
        self.error = None;
    }

    /// Drop the last result and error; an outstanding request is left alone
    pub fn clear(&mut self) {
        if self.is_busy() {
            return;
        }
        self.phase = FlowPhase::Idle;
        self.result = None;
        self.error = None;
    }

    fn accepts(&self, ticket: FlowTicket) -> bool {
        let current = self.is_busy() && ticket.0 == self.generation;
        if !current {
            debug!("Discarding completion for stale ticket {}", ticket.0);
        }
        current
    }
}

/// Why a dashboard submission did not go out
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRejection {
    InFlight,
    Invalid(FieldErrors),
}

/// Dashboard page state: the form and the score flow
#[derive(Debug, Clone)]
pub struct DashboardSession {
    pub form: SleepForm,
    pub score: ActionFlow<ScoreResponse>,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self {
            form: SleepForm::with_defaults(),
            score: ActionFlow::new(),
        }
    }
}

impl DashboardSession {
    /// Apply a submitted form body and, when valid and idle, start a request.
    ///
    /// An invalid submission clears the previous score. Field edits are always kept so they shape the next request, even when
    /// this one is refused.
    pub fn begin_submission(
        &mut self,
        submitted: &HashMap<String, String>,
    ) -> Result<(FlowTicket, SleepMetricsInput), SubmitRejection> {
        if self.form.apply_submission(submitted) > 0 {
            self.score.edit();
        }
        if self.score.is_busy() {
            return Err(SubmitRejection::InFlight);
        }

        // The last score no longer matches what is on the form
        let input = self.form.submit().map_err(|errors| {
            self.score.clear();
            SubmitRejection::Invalid(errors)
        })?;
        let ticket = self.score.begin().map_err(|_| SubmitRejection::InFlight)?;
        Ok((ticket, input))
    }
}

/// Lab report page state
#[derive(Debug, Clone, Default)]
pub struct LabSession {
    /// Name of the most recently chosen file
    pub file_name: Option<String>,
    pub report: ActionFlow<BiomarkerReport>,
}

impl LabSession {
    pub fn begin_upload(&mut self, file_name: &str) -> Result<FlowTicket, FlowError> {
        let ticket = self.report.begin()?;
        self.file_name = Some(file_name.to_string());
        Ok(ticket)
    }
}
