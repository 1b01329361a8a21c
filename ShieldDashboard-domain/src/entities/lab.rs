use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::wire;

/// A lab-measured value extracted from an uploaded report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Biomarker {
    #[serde(deserialize_with = "wire::number_from_scalar")]
    pub value: f64,

    #[serde(default, deserialize_with = "wire::text_from_scalar")]
    pub unit: String,

    /// Lower reference bound, when the report states one
    #[serde(default, deserialize_with = "wire::optional_number_from_scalar")]
    pub ref_low: Option<f64>,

    /// Upper reference bound, when the report states one
    #[serde(default, deserialize_with = "wire::optional_number_from_scalar")]
    pub ref_high: Option<f64>,

    /// Backend classification, e.g. "IN RANGE" or "BORDERLINE"
    #[serde(default, deserialize_with = "wire::text_from_scalar")]
    pub status: String,
}

impl Biomarker {
    /// Human-readable reference range: `low-high unit`, `≥low unit`,
    /// `≤high unit`, or empty when the report gives no bounds.
    pub fn reference_range(&self) -> String {
        let range = match (self.ref_low, self.ref_high) {
            (Some(low), Some(high)) => format!("{}-{}", low, high),
            (Some(low), None) => format!("≥{}", low),
            (None, Some(high)) => format!("≤{}", high),
            (None, None) => return String::new(),
        };

        if self.unit.is_empty() {
            range
        } else {
            format!("{} {}", range, self.unit)
        }
    }
}

/// Biomarkers extracted from a lab report
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BiomarkerReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default)]
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub biomarkers: IndexMap<String, Biomarker>,

    /// Free-text suggestions generated by the backend
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "wire::optional_text")]
    pub suggestions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "wire::optional_text")]
    pub message: Option<String>,
}

/// A file selected for upload
#[derive(Debug, Clone)]
pub struct LabUpload {
    pub file_name: String,

    /// MIME type declared by the browser, if any
    pub content_type: Option<String>,

    pub bytes: Vec<u8>,
}

impl LabUpload {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    /// Whether the upload is a PDF.
    ///
    /// A declared type decides on its own. When nothing useful is declared
    /// (no type or `application/octet-stream`) the `.pdf` extension decides.
    pub fn is_pdf(&self) -> bool {
        let declared = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.parse::<mime::Mime>().ok());

        match declared {
            Some(m) if m == mime::APPLICATION_OCTET_STREAM => self.has_pdf_extension(),
            Some(m) => m.essence_str() == mime::APPLICATION_PDF.essence_str(),
            None => self.has_pdf_extension(),
        }
    }

    fn has_pdf_extension(&self) -> bool {
        self.file_name.to_ascii_lowercase().ends_with(".pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(ref_low: Option<f64>, ref_high: Option<f64>, unit: &str) -> Biomarker {
        Biomarker {
            value: 13.2,
            unit: unit.to_string(),
            ref_low,
            ref_high,
            status: String::new(),
        }
    }

    #[test]
    fn test_reference_range_text() {
        assert_eq!(marker(Some(13.0), Some(17.0), "g/dL").reference_range(), "13-17 g/dL");
        assert_eq!(marker(Some(70.0), None, "mg/dL").reference_range(), "≥70 mg/dL");
        assert_eq!(marker(None, Some(3.0), "").reference_range(), "≤3");
        assert_eq!(marker(None, None, "fL").reference_range(), "");
    }

    #[test]
    fn test_report_decodes_backend_strings() {
        let json = r#"{
            "filename": "report.pdf",
            "biomarkers": {
                "Hemoglobin": {"value": "13.2", "unit": "g/dL", "ref_low": "13", "ref_high": "17", "status": "IN RANGE"},
                "Glucose, Fasting": {"value": "92", "unit": "mg/dL", "ref_low": "", "ref_high": ""},
                "Platelet Count": {"value": "1,50,000", "unit": "cells/cu.mm", "ref_low": "1,50,000", "ref_high": "4,10,000"}
            },
            "suggestions": "Stay hydrated.",
            "message": "File received securely. Biomarker extraction complete."
        }"#;
        let report: BiomarkerReport = serde_json::from_str(json).unwrap();

        assert_eq!(report.biomarkers.len(), 3);
        let hemoglobin = &report.biomarkers["Hemoglobin"];
        assert_eq!(hemoglobin.value, 13.2);
        assert_eq!(hemoglobin.status, "IN RANGE");

        let glucose = &report.biomarkers["Glucose, Fasting"];
        assert_eq!(glucose.ref_low, None);
        assert_eq!(glucose.status, "");

        assert_eq!(report.biomarkers["Platelet Count"].ref_high, Some(410000.0));
        assert_eq!(report.suggestions.as_deref(), Some("Stay hydrated."));
    }

    #[test]
    fn test_blank_suggestions_are_absent() {
        let report: BiomarkerReport = serde_json::from_str(r#"{"biomarkers": {}, "suggestions": "  "}"#).unwrap();
        assert!(report.suggestions.is_none());
    }

    #[test]
    fn test_pdf_detection() {
        let pdf = LabUpload::new("labs.PDF", Some("application/pdf".to_string()), vec![1]);
        assert!(pdf.is_pdf());

        let unlabeled = LabUpload::new("labs.pdf", None, vec![1]);
        assert!(unlabeled.is_pdf());

        let octet = LabUpload::new("labs.pdf", Some("application/octet-stream".to_string()), vec![1]);
        assert!(octet.is_pdf());

        let image = LabUpload::new("labs.pdf", Some("image/png".to_string()), vec![1]);
        assert!(!image.is_pdf());

        let text = LabUpload::new("notes.txt", None, vec![1]);
        assert!(!text.is_pdf());
    }
}
