// Domain entities and value objects
pub mod lab;
pub mod sleep;
pub mod wire;

// Re-export common types for easier imports
pub use lab::{Biomarker, BiomarkerReport, LabUpload};
pub use sleep::{
    Alert, AlertSeverity, BreakdownValue, Metric, MetricBreakdown, ScoreResponse, Sex, SleepMetricsInput,
};
