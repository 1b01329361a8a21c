//! Dashboard input form state
//!
//! `SleepForm` holds what the user typed, coerces each edit into a typed
//! value and packages the full set into a [`SleepMetricsInput`] on submit.
//! Nothing leaves the form until every field is present and within bounds.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::entities::sleep::{Sex, SleepMetricsInput};
use crate::services::validation::validate_metrics;

/// Editable fields of the dashboard form, in on-screen order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Age,
    Sex,
    TotalSleepHours,
    SleepEfficiency,
    RemPercentage,
    SleepLatency,
    Hrv,
    TimingConsistency,
    ChronotypeAlignment,
}

/// How a field's text is coerced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Decimal number with inclusive display bounds and input step
    Decimal { min: f64, max: f64, step: f64 },
    /// Whole number
    Whole { min: u32, max: u32 },
    /// One of the `Sex` variants
    Choice,
    /// Yes / no
    Flag,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        FormField::Age,
        FormField::Sex,
        FormField::TotalSleepHours,
        FormField::SleepEfficiency,
        FormField::RemPercentage,
        FormField::SleepLatency,
        FormField::Hrv,
        FormField::TimingConsistency,
        FormField::ChronotypeAlignment,
    ];

    /// Name used in HTML forms and on the wire
    pub fn name(&self) -> &'static str {
        match self {
            FormField::Age => "age",
            FormField::Sex => "sex",
            FormField::TotalSleepHours => "total_sleep_hours",
            FormField::SleepEfficiency => "sleep_efficiency",
            FormField::RemPercentage => "REM_percentage",
            FormField::SleepLatency => "sleep_latency",
            FormField::Hrv => "hrv",
            FormField::TimingConsistency => "timing_consistency",
            FormField::ChronotypeAlignment => "chronotype_alignment",
        }
    }

    /// Look up a field by wire name or Rust field name, ignoring case
    pub fn from_name(name: &str) -> Option<FormField> {
        FormField::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Age => "Age",
            FormField::Sex => "Sex",
            FormField::TotalSleepHours => "Total Sleep Hours",
            FormField::SleepEfficiency => "Sleep Efficiency (%)",
            FormField::RemPercentage => "REM Sleep (%)",
            FormField::SleepLatency => "Sleep Latency (min)",
            FormField::Hrv => "HRV (ms)",
            FormField::TimingConsistency => "Timing Consistency (hr)",
            FormField::ChronotypeAlignment => "Chronotype Alignment",
        }
    }

    /// Sentence-case subject used in error messages
    pub(crate) fn subject(&self) -> &'static str {
        match self {
            FormField::Age => "Age",
            FormField::Sex => "Sex",
            FormField::TotalSleepHours => "Total sleep hours",
            FormField::SleepEfficiency => "Sleep efficiency",
            FormField::RemPercentage => "REM percentage",
            FormField::SleepLatency => "Sleep latency",
            FormField::Hrv => "HRV",
            FormField::TimingConsistency => "Timing consistency",
            FormField::ChronotypeAlignment => "Chronotype alignment",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FormField::Age => FieldKind::Whole { min: 0, max: 120 },
            FormField::Sex => FieldKind::Choice,
            FormField::TotalSleepHours => FieldKind::Decimal { min: 0.0, max: 24.0, step: 0.1 },
            FormField::SleepEfficiency => FieldKind::Decimal { min: 0.0, max: 100.0, step: 0.1 },
            FormField::RemPercentage => FieldKind::Decimal { min: 0.0, max: 100.0, step: 0.1 },
            FormField::SleepLatency => FieldKind::Decimal { min: 0.0, max: 180.0, step: 1.0 },
            FormField::Hrv => FieldKind::Decimal { min: 0.0, max: 300.0, step: 1.0 },
            FormField::TimingConsistency => FieldKind::Decimal { min: 0.0, max: 12.0, step: 0.1 },
            FormField::ChronotypeAlignment => FieldKind::Flag,
        }
    }

    pub fn required_message(&self) -> String {
        format!("{} is required", self.subject())
    }

    fn not_a_number_message(&self) -> String {
        match self.kind() {
            FieldKind::Whole { .. } => format!("{} must be a whole number", self.subject()),
            _ => format!("{} must be a number", self.subject()),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field-level validation messages, ordered as the form displays them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: FormField) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Messages keyed by wire field name
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(field, message)| (field.name().to_string(), message.clone()))
            .collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field.name(), message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FieldErrors {}

/// Current contents of the dashboard form
#[derive(Debug, Clone, Default)]
pub struct SleepForm {
    raw: HashMap<FormField, String>,
    numbers: HashMap<FormField, f64>,
    age: Option<u32>,
    sex: Option<Sex>,
    chronotype_alignment: Option<bool>,
    errors: FieldErrors,
}

impl SleepForm {
    /// An empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled with the dashboard's starting values
    pub fn with_defaults() -> Self {
        let mut form = Self::new();
        for (field, value) in [
            (FormField::TotalSleepHours, "6.5"),
            (FormField::SleepEfficiency, "88"),
            (FormField::RemPercentage, "16"),
            (FormField::Age, "45"),
            (FormField::Sex, "male"),
        ] {
            form.apply_change(field, value);
        }
        form
    }

    /// Update exactly one field from its raw text.
    ///
    /// Returns whether the stored text changed. Coercion failures are kept
    /// as field errors and leave the typed value empty.
    pub fn apply_change(&mut self, field: FormField, raw: &str) -> bool {
        let changed = self.raw.get(&field).map(String::as_str) != Some(raw);
        self.raw.insert(field, raw.to_string());
        self.errors.remove(field);

        if let Err(message) = self.coerce(field, raw.trim()) {
            self.errors.insert(field, message);
        }
        changed
    }

    /// Apply every field from a submitted form body; absent fields are blank.
    ///
    /// Returns the number of fields whose text changed.
    pub fn apply_submission(&mut self, submitted: &HashMap<String, String>) -> usize {
        FormField::ALL
            .into_iter()
            .filter(|field| {
                let raw = submitted.get(field.name()).map(String::as_str).unwrap_or("");
                self.apply_change(*field, raw)
            })
            .count()
    }

    fn coerce(&mut self, field: FormField, text: &str) -> Result<(), String> {
        match field.kind() {
            FieldKind::Decimal { .. } => {
                self.numbers.remove(&field);
                if let Some(value) = parse_decimal(field, text)? {
                    self.numbers.insert(field, value);
                }
            }
            FieldKind::Whole { min, max } => {
                self.age = None;
                if text.is_empty() {
                    return Ok(());
                }
                let value = parse_decimal(field, text)?.unwrap_or_default();
                if value.fract() != 0.0 {
                    return Err(field.not_a_number_message());
                }
                if value < min as f64 || value > u32::MAX as f64 {
                    return Err(format!("{} must be between {} and {}", field.subject(), min, max));
                }
                self.age = Some(value as u32);
            }
            FieldKind::Choice => {
                self.sex = None;
                if text.is_empty() {
                    return Ok(());
                }
                let sex = text
                    .parse::<Sex>()
                    .map_err(|_| "Sex must be one of male, female, other".to_string())?;
                self.sex = Some(sex);
            }
            FieldKind::Flag => {
                self.chronotype_alignment = None;
                self.chronotype_alignment = match text.to_ascii_lowercase().as_str() {
                    "" => None,
                    "true" | "yes" | "on" | "1" => Some(true),
                    "false" | "no" | "off" | "0" => Some(false),
                    _ => return Err(format!("{} must be yes or no", field.subject())),
                };
            }
        }
        Ok(())
    }

    /// Text to show in a field's input
    pub fn value_text(&self, field: FormField) -> &str {
        self.raw.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Package the full input set for submission.
    ///
    /// Missing fields, coercion failures and out-of-range values all block
    /// submission; the returned errors are also kept on the form for display.
    pub fn submit(&mut self) -> Result<SleepMetricsInput, FieldErrors> {
        for field in FormField::ALL {
            if !self.errors.contains(field) && !self.has_value(field) {
                self.errors.insert(field, field.required_message());
            }
        }
        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }

        let number = |field: FormField| self.numbers.get(&field).copied().unwrap_or_default();
        let input = SleepMetricsInput {
            total_sleep_hours: number(FormField::TotalSleepHours),
            sleep_efficiency: number(FormField::SleepEfficiency),
            rem_percentage: number(FormField::RemPercentage),
            age: self.age.unwrap_or_default(),
            sex: self.sex.unwrap_or(Sex::Other),
            sleep_latency: number(FormField::SleepLatency),
            hrv: number(FormField::Hrv),
            timing_consistency: number(FormField::TimingConsistency),
            chronotype_alignment: self.chronotype_alignment.unwrap_or_default(),
        };

        if let Err(errors) = validate_metrics(&input) {
            self.errors = errors.clone();
            return Err(errors);
        }
        Ok(input)
    }

    fn has_value(&self, field: FormField) -> bool {
        match field.kind() {
            FieldKind::Decimal { .. } => self.numbers.contains_key(&field),
            FieldKind::Whole { .. } => self.age.is_some(),
            FieldKind::Choice => self.sex.is_some(),
            FieldKind::Flag => self.chronotype_alignment.is_some(),
        }
    }
}

/// `Ok(None)` for blank text; non-finite numbers count as non-numeric
fn parse_decimal(field: FormField, text: &str) -> Result<Option<f64>, String> {
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(field.not_a_number_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> SleepForm {
        let mut form = SleepForm::new();
        for (field, value) in [
            (FormField::TotalSleepHours, "7.5"),
            (FormField::SleepEfficiency, "90"),
            (FormField::RemPercentage, "22"),
            (FormField::Age, "35"),
            (FormField::Sex, "male"),
            (FormField::SleepLatency, "15"),
            (FormField::Hrv, "60"),
            (FormField::TimingConsistency, "0.5"),
            (FormField::ChronotypeAlignment, "true"),
        ] {
            form.apply_change(field, value);
        }
        form
    }

    #[test]
    fn test_complete_form_submits() {
        let mut form = filled_form();
        let input = form.submit().expect("form should be valid");

        assert_eq!(input.total_sleep_hours, 7.5);
        assert_eq!(input.rem_percentage, 22.0);
        assert_eq!(input.age, 35);
        assert_eq!(input.sex, Sex::Male);
        assert!(input.chronotype_alignment);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_change_updates_one_field() {
        let mut form = filled_form();
        assert!(form.apply_change(FormField::Hrv, "75"));
        assert!(!form.apply_change(FormField::Hrv, "75"));

        let input = form.submit().unwrap();
        assert_eq!(input.hrv, 75.0);
        assert_eq!(input.sleep_latency, 15.0);
    }

    #[test]
    fn test_non_numeric_text_is_a_field_error() {
        let mut form = filled_form();
        form.apply_change(FormField::SleepLatency, "fifteen");
        form.apply_change(FormField::Age, "35.5");
        form.apply_change(FormField::Hrv, "NaN");

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get(FormField::SleepLatency), Some("Sleep latency must be a number"));
        assert_eq!(errors.get(FormField::Age), Some("Age must be a whole number"));
        assert_eq!(errors.get(FormField::Hrv), Some("HRV must be a number"));
        assert_eq!(form.value_text(FormField::SleepLatency), "fifteen");
    }

    #[test]
    fn test_missing_fields_are_required() {
        let mut form = SleepForm::with_defaults();
        let errors = form.submit().unwrap_err();

        assert_eq!(errors.get(FormField::Hrv), Some("HRV is required"));
        assert_eq!(errors.get(FormField::ChronotypeAlignment), Some("Chronotype alignment is required"));
        assert!(!errors.contains(FormField::Age));
        assert!(!errors.contains(FormField::TotalSleepHours));
    }

    #[test]
    fn test_out_of_range_efficiency_names_the_bound() {
        let mut form = filled_form();
        form.apply_change(FormField::SleepEfficiency, "150");

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(FormField::SleepEfficiency),
            Some("Sleep efficiency must be between 0 and 100")
        );
    }

    #[test]
    fn test_negative_age_names_the_bound() {
        let mut form = filled_form();
        form.apply_change(FormField::Age, "-1");
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get(FormField::Age), Some("Age must be between 0 and 120"));
    }

    #[test]
    fn test_unknown_sex_and_flag_values() {
        let mut form = filled_form();
        form.apply_change(FormField::Sex, "robot");
        form.apply_change(FormField::ChronotypeAlignment, "maybe");

        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get(FormField::Sex), Some("Sex must be one of male, female, other"));
        assert_eq!(errors.get(FormField::ChronotypeAlignment), Some("Chronotype alignment must be yes or no"));
    }

    #[test]
    fn test_edit_clears_that_fields_error() {
        let mut form = filled_form();
        form.apply_change(FormField::SleepEfficiency, "150");
        assert!(form.submit().is_err());

        form.apply_change(FormField::SleepEfficiency, "95");
        assert!(form.error(FormField::SleepEfficiency).is_none());
        assert!(form.submit().is_ok());
    }

    #[test]
    fn test_apply_submission_blanks_absent_fields() {
        let mut form = filled_form();
        let submitted: HashMap<String, String> = FormField::ALL
            .into_iter()
            .filter(|field| *field != FormField::Hrv)
            .map(|field| (field.name().to_string(), form.value_text(field).to_string()))
            .collect();

        let changed = form.apply_submission(&submitted);
        assert_eq!(changed, 1);
        assert_eq!(form.submit().unwrap_err().get(FormField::Hrv), Some("HRV is required"));
    }

    #[test]
    fn test_field_lookup_accepts_rust_and_wire_names() {
        assert_eq!(FormField::from_name("rem_percentage"), Some(FormField::RemPercentage));
        assert_eq!(FormField::from_name("REM_percentage"), Some(FormField::RemPercentage));
        assert_eq!(FormField::from_name("deep_sleep"), None);
    }
}
