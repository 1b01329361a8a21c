use tracing::warn;
use validator::Validate;

use crate::entities::sleep::SleepMetricsInput;
use crate::forms::{FieldErrors, FormField};

/// Check every bound on a metrics input before it is sent for scoring.
///
/// Bounds are inclusive except HRV, which must be strictly positive.
pub fn validate_metrics(input: &SleepMetricsInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    // Use the validator crate's range rules
    if let Err(validation_errors) = input.validate() {
        for (field, field_errors) in validation_errors.field_errors() {
            let Some(form_field) = FormField::from_name(field) else {
                warn!("Validation error for unmapped field {}", field);
                continue;
            };
            let message = field_errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", form_field.name()),
                })
                .collect::<Vec<String>>()
                .join(", ");
            errors.insert(form_field, message);
        }
    }

    // NaN slips through range checks
    for (field, value) in [
        (FormField::TotalSleepHours, input.total_sleep_hours),
        (FormField::SleepEfficiency, input.sleep_efficiency),
        (FormField::RemPercentage, input.rem_percentage),
        (FormField::SleepLatency, input.sleep_latency),
        (FormField::Hrv, input.hrv),
        (FormField::TimingConsistency, input.timing_consistency),
    ] {
        if !value.is_finite() {
            errors.insert(field, format!("{} must be a number", field.subject()));
        }
    }

    // Additional validation: HRV has an exclusive lower bound
    if !errors.contains(FormField::Hrv) && input.hrv <= 0.0 {
        errors.insert(FormField::Hrv, "HRV must be greater than 0 and at most 300");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sleep::Sex;

    fn valid_input() -> SleepMetricsInput {
        SleepMetricsInput {
            total_sleep_hours: 7.5,
            sleep_efficiency: 90.0,
            rem_percentage: 22.0,
            age: 35,
            sex: Sex::Male,
            sleep_latency: 15.0,
            hrv: 60.0,
            timing_consistency: 0.5,
            chronotype_alignment: true,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(validate_metrics(&valid_input()).is_ok());
    }

    #[test]
    fn test_upper_boundaries_are_accepted() {
        let input = SleepMetricsInput {
            total_sleep_hours: 24.0,
            sleep_efficiency: 100.0,
            rem_percentage: 100.0,
            age: 120,
            sleep_latency: 180.0,
            hrv: 300.0,
            timing_consistency: 12.0,
            ..valid_input()
        };
        assert!(validate_metrics(&input).is_ok());
    }

    #[test]
    fn test_lower_boundaries_are_accepted() {
        let input = SleepMetricsInput {
            total_sleep_hours: 0.0,
            sleep_efficiency: 0.0,
            rem_percentage: 0.0,
            age: 0,
            sleep_latency: 0.0,
            hrv: 0.1,
            timing_consistency: 0.0,
            ..valid_input()
        };
        assert!(validate_metrics(&input).is_ok());
    }

    #[test]
    fn test_each_bound_is_reported_on_its_field() {
        let cases = [
            (SleepMetricsInput { total_sleep_hours: 24.1, ..valid_input() }, FormField::TotalSleepHours, "between 0 and 24"),
            (SleepMetricsInput { sleep_efficiency: 150.0, ..valid_input() }, FormField::SleepEfficiency, "between 0 and 100"),
            (SleepMetricsInput { rem_percentage: -1.0, ..valid_input() }, FormField::RemPercentage, "between 0 and 100"),
            (SleepMetricsInput { age: 121, ..valid_input() }, FormField::Age, "between 0 and 120"),
            (SleepMetricsInput { sleep_latency: 181.0, ..valid_input() }, FormField::SleepLatency, "between 0 and 180"),
            (SleepMetricsInput { hrv: 300.5, ..valid_input() }, FormField::Hrv, "at most 300"),
            (SleepMetricsInput { timing_consistency: 12.5, ..valid_input() }, FormField::TimingConsistency, "between 0 and 12"),
        ];

        for (input, field, expected) in cases {
            let errors = validate_metrics(&input).unwrap_err();
            assert_eq!(errors.len(), 1, "only {} should fail", field);
            let message = errors.get(field).unwrap_or_default();
            assert!(message.contains(expected), "'{}' should mention '{}'", message, expected);
        }
    }

    #[test]
    fn test_zero_hrv_is_rejected() {
        let errors = validate_metrics(&SleepMetricsInput { hrv: 0.0, ..valid_input() }).unwrap_err();
        assert_eq!(errors.get(FormField::Hrv), Some("HRV must be greater than 0 and at most 300"));
    }

    #[test]
    fn test_nan_is_rejected() {
        let errors = validate_metrics(&SleepMetricsInput { sleep_latency: f64::NAN, ..valid_input() }).unwrap_err();
        assert!(errors.contains(FormField::SleepLatency));
    }
}
