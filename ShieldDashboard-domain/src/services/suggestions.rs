use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Canned advice for alerts the backend is known to raise, keyed by exact alert text
static ALERT_SUGGESTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "Insufficient total hours",
            "Aim for at least 7-8 hours of sleep per night. Try to maintain a consistent sleep schedule.",
        ),
        (
            "Low sleep efficiency",
            "Improve your sleep environment and avoid screens before bed. Consider relaxation techniques.",
        ),
        (
            "Low REM sleep",
            "Try to reduce stress and avoid alcohol before bedtime. Maintain a regular sleep routine.",
        ),
        (
            "Insufficient total hours (age risk)",
            "Older adults may need to prioritize sleep even more. Consult a healthcare provider if sleep issues persist.",
        ),
    ])
});

/// Suggestion for an alert, matched on the exact alert text
pub fn suggestion_for(alert: &str) -> Option<&'static str> {
    ALERT_SUGGESTIONS.get(alert).copied()
}
