use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::wire;

/// Biological sex as accepted by the scoring backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Other];

    /// Wire value sent to the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            "other" => Ok(Sex::Other),
            other => Err(format!("Unknown sex: {}", other)),
        }
    }
}

/// Sleep and recovery metrics submitted for scoring
///
/// Field order and names match the backend's request contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SleepMetricsInput {
    /// Total sleep in hours
    #[validate(range(min = 0.0, max = 24.0, message = "Total sleep hours must be between 0 and 24"))]
    pub total_sleep_hours: f64,

    /// Time asleep as a percentage of time in bed
    #[validate(range(min = 0.0, max = 100.0, message = "Sleep efficiency must be between 0 and 100"))]
    pub sleep_efficiency: f64,

    /// Share of total sleep spent in REM, in percent
    #[serde(rename = "REM_percentage")]
    #[validate(range(min = 0.0, max = 100.0, message = "REM percentage must be between 0 and 100"))]
    pub rem_percentage: f64,

    /// Age in years
    #[validate(range(max = 120, message = "Age must be between 0 and 120"))]
    pub age: u32,

    pub sex: Sex,

    /// Minutes from lights out to sleep onset
    #[validate(range(min = 0.0, max = 180.0, message = "Sleep latency must be between 0 and 180 minutes"))]
    pub sleep_latency: f64,

    /// Heart-rate variability in milliseconds; the lower bound is exclusive
    /// and checked in `services::validation`
    #[validate(range(max = 300.0, message = "HRV must be greater than 0 and at most 300"))]
    pub hrv: f64,

    /// Variance of sleep timing in hours
    #[validate(range(min = 0.0, max = 12.0, message = "Timing consistency must be between 0 and 12 hours"))]
    pub timing_consistency: f64,

    /// Whether the sleep window matches the user's chronotype
    pub chronotype_alignment: bool,
}

/// Metrics the backend scores, in dashboard display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Hrv,
    TotalSleepHours,
    SleepEfficiency,
    RemPercentage,
    SleepLatency,
    TimingConsistency,
    ChronotypeAlignment,
}

impl Metric {
    pub const DISPLAY_ORDER: [Metric; 7] = [
        Metric::Hrv,
        Metric::TotalSleepHours,
        Metric::SleepEfficiency,
        Metric::RemPercentage,
        Metric::SleepLatency,
        Metric::TimingConsistency,
        Metric::ChronotypeAlignment,
    ];

    /// Breakdown key used by the backend
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Hrv => "hrv",
            Metric::TotalSleepHours => "total_sleep_hours",
            Metric::SleepEfficiency => "sleep_efficiency",
            Metric::RemPercentage => "REM_percentage",
            Metric::SleepLatency => "sleep_latency",
            Metric::TimingConsistency => "timing_consistency",
            Metric::ChronotypeAlignment => "chronotype_alignment",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::DISPLAY_ORDER.into_iter().find(|m| m.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Hrv => "HRV",
            Metric::TotalSleepHours => "Total Sleep Hours",
            Metric::SleepEfficiency => "Sleep Efficiency",
            Metric::RemPercentage => "REM Sleep",
            Metric::SleepLatency => "Sleep Latency",
            Metric::TimingConsistency => "Timing Consistency",
            Metric::ChronotypeAlignment => "Chronotype Alignment",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Metric::Hrv => "💓",
            Metric::TotalSleepHours => "😴",
            Metric::SleepEfficiency => "📈",
            Metric::RemPercentage => "🌙",
            Metric::SleepLatency => "⏱️",
            Metric::TimingConsistency => "⏰",
            Metric::ChronotypeAlignment => "🧬",
        }
    }
}

/// Observed value of a metric as echoed back by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BreakdownValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for BreakdownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownValue::Flag(flag) => write!(f, "{}", flag),
            BreakdownValue::Number(n) => write!(f, "{}", n),
            BreakdownValue::Text(s) => f.write_str(s),
        }
    }
}

/// Per-metric scoring detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBreakdown {
    pub value: BreakdownValue,

    /// Description of the optimal range
    #[serde(deserialize_with = "wire::text_from_scalar")]
    pub optimal: String,

    /// Signed contribution to the bio-age delta; positive is adverse
    pub impact: f64,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "wire::optional_text")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "wire::optional_text")]
    pub help: Option<String>,
}

/// Alert severity; anything unrecognised is treated as informational
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AlertSeverity {
    #[default]
    Info,
    Warning,
    Error,
}

impl From<String> for AlertSeverity {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "warning" => AlertSeverity::Warning,
            "error" => AlertSeverity::Error,
            _ => AlertSeverity::Info,
        }
    }
}

/// An alert raised by the scoring backend
///
/// Older backends send bare strings, newer ones send objects with a
/// severity and an optional suggestion. Both decode to this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AlertWire")]
pub struct Alert {
    pub message: String,
    pub severity: AlertSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Alert {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: AlertSeverity::Info,
            suggestion: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AlertWire {
    Text(String),
    Detailed {
        message: String,
        #[serde(default)]
        severity: AlertSeverity,
        #[serde(default, deserialize_with = "wire::optional_text")]
        suggestion: Option<String>,
    },
}

impl From<AlertWire> for Alert {
    fn from(wire: AlertWire) -> Self {
        match wire {
            AlertWire::Text(message) => Alert::new(message),
            AlertWire::Detailed { message, severity, suggestion } => Alert {
                message,
                severity,
                suggestion,
            },
        }
    }
}

/// Scoring result returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ScoreResponse {
    /// Composite SHIELD sleep score, nominally 0-100
    pub shield_score: f64,

    /// Estimated biological-age impact in years
    pub bio_age_delta: f64,

    #[serde(default)]
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub alerts: Vec<Alert>,

    /// Breakdown keyed by metric, in the order the backend sent it
    #[serde(default)]
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub breakdown: IndexMap<String, MetricBreakdown>,
}
