//! View models for the result pages
//!
//! These turn backend responses into display-ready values so the HTML
//! layer only has to lay them out.

use tracing::warn;

use crate::entities::lab::BiomarkerReport;
use crate::entities::sleep::{Alert, AlertSeverity, Metric, MetricBreakdown, ScoreResponse};
use crate::services::suggestions::suggestion_for;

/// Radius of the score ring, in SVG user units
pub const GAUGE_RADIUS: f64 = 40.0;

/// Circular score gauge
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGauge {
    /// Raw score as sent by the backend
    pub score: f64,
    /// Filled share of the ring, always within 0..=1
    pub fraction: f64,
}

impl ScoreGauge {
    pub fn new(score: f64) -> Self {
        let fraction = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 100.0) / 100.0
        };
        Self { score, fraction }
    }

    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * GAUGE_RADIUS
    }

    /// `stroke-dashoffset` leaving the unfilled part of the ring empty
    pub fn dash_offset(&self) -> f64 {
        self.circumference() * (1.0 - self.fraction)
    }

    pub fn score_text(&self) -> String {
        self.score.to_string()
    }
}

/// How the bio-age delta reads to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaTier {
    /// Zero or younger
    Favorable,
    /// Less than a year older
    Caution,
    /// A year or more older
    Unfavorable,
}

impl DeltaTier {
    pub fn from_delta(delta: f64) -> Self {
        if delta <= 0.0 {
            DeltaTier::Favorable
        } else if delta < 1.0 {
            DeltaTier::Caution
        } else {
            DeltaTier::Unfavorable
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            DeltaTier::Favorable => "delta-favorable",
            DeltaTier::Caution => "delta-caution",
            DeltaTier::Unfavorable => "delta-unfavorable",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            DeltaTier::Favorable => "#43a047",
            DeltaTier::Caution => "#ffa000",
            DeltaTier::Unfavorable => "#d32f2f",
        }
    }
}

/// Bio-age delta card
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaView {
    pub delta: f64,
    pub tier: DeltaTier,
}

impl DeltaView {
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            tier: DeltaTier::from_delta(delta),
        }
    }

    /// Signed years, e.g. "+1.4 yrs" or "-2 yrs"
    pub fn text(&self) -> String {
        let sign = if self.delta > 0.0 { "+" } else { "" };
        format!("{}{} yrs", sign, self.delta)
    }
}

/// One card in the metric breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub key: String,
    pub label: String,
    pub icon: Option<&'static str>,
    pub value: String,
    pub optimal: String,
    pub impact: f64,
    pub help: Option<String>,
}

impl MetricCard {
    fn new(key: &str, metric: Option<Metric>, breakdown: &MetricBreakdown) -> Self {
        let label = match (metric, &breakdown.label) {
            (Some(known), _) => known.label().to_string(),
            (None, Some(label)) => label.clone(),
            (None, None) => key.to_string(),
        };

        Self {
            key: key.to_string(),
            label,
            icon: metric.map(|m| m.icon()),
            value: breakdown.value.to_string(),
            optimal: breakdown.optimal.clone(),
            impact: breakdown.impact,
            help: breakdown.help.clone(),
        }
    }

    pub fn impact_text(&self) -> String {
        self.impact.to_string()
    }

    /// Bar width in percent: |impact| scaled to 100 and capped there
    pub fn bar_width(&self) -> f64 {
        let width = (self.impact.abs() * 100.0).min(100.0);
        if width.is_nan() {
            0.0
        } else {
            width
        }
    }

    /// Positive impact pushes bio-age up
    pub fn is_adverse(&self) -> bool {
        self.impact > 0.0
    }
}

/// Cards for every breakdown entry: known metrics in display order, then
/// unknown keys in the order the backend sent them.
pub fn metric_cards(response: &ScoreResponse) -> Vec<MetricCard> {
    let mut cards = Vec::with_capacity(response.breakdown.len());

    for metric in Metric::DISPLAY_ORDER {
        match response.breakdown.get(metric.key()) {
            Some(breakdown) => cards.push(MetricCard::new(metric.key(), Some(metric), breakdown)),
            None => warn!("Breakdown is missing metric {}", metric.key()),
        }
    }

    for (key, breakdown) in &response.breakdown {
        if Metric::from_key(key).is_none() {
            warn!("Unknown breakdown key {}", key);
            cards.push(MetricCard::new(key, None, breakdown));
        }
    }

    cards
}

/// An alert ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct AlertView {
    pub message: String,
    pub severity: AlertSeverity,
    pub suggestion: Option<String>,
}

impl AlertView {
    fn new(alert: &Alert) -> Self {
        let suggestion = alert
            .suggestion
            .clone()
            .or_else(|| suggestion_for(&alert.message).map(str::to_string));

        Self {
            message: alert.message.clone(),
            severity: alert.severity,
            suggestion,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self.severity {
            AlertSeverity::Info => "ℹ️",
            AlertSeverity::Warning => "⚠️",
            AlertSeverity::Error => "❌",
        }
    }

    pub fn color(&self) -> &'static str {
        match self.severity {
            AlertSeverity::Info => "#1976d2",
            AlertSeverity::Warning => "#ffa000",
            AlertSeverity::Error => "#d32f2f",
        }
    }
}

pub fn alert_views(alerts: &[Alert]) -> Vec<AlertView> {
    alerts.iter().map(AlertView::new).collect()
}

/// Everything the dashboard shows for one score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreView {
    pub gauge: ScoreGauge,
    pub delta: DeltaView,
    pub cards: Vec<MetricCard>,
    pub alerts: Vec<AlertView>,
}

impl From<&ScoreResponse> for ScoreView {
    fn from(response: &ScoreResponse) -> Self {
        Self {
            gauge: ScoreGauge::new(response.shield_score),
            delta: DeltaView::new(response.bio_age_delta),
            cards: metric_cards(response),
            alerts: alert_views(&response.alerts),
        }
    }
}

/// One extracted biomarker
#[derive(Debug, Clone, PartialEq)]
pub struct BiomarkerRow {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub reference_range: String,
    pub status: String,
    /// Chart bar length in percent of the largest value
    pub bar_percent: f64,
}

pub fn biomarker_rows(report: &BiomarkerReport) -> Vec<BiomarkerRow> {
    let max = report
        .biomarkers
        .values()
        .map(|b| b.value)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    report
        .biomarkers
        .iter()
        .map(|(name, marker)| {
            let bar_percent = if max > 0.0 && marker.value.is_finite() {
                (marker.value / max * 100.0).max(0.0)
            } else {
                0.0
            };
            BiomarkerRow {
                name: name.clone(),
                value: marker.value,
                unit: marker.unit.clone(),
                reference_range: marker.reference_range(),
                status: marker.status.clone(),
                bar_percent,
            }
        })
        .collect()
}
