pub mod dashboard;
pub mod health;
pub mod lab_report;
pub mod score_api;

// Tests module
#[cfg(test)]
mod tests;

use axum::response::Redirect;

// Re-export handlers for easier imports
pub use dashboard::{show_dashboard, submit_dashboard};
pub use health::health_check;
pub use lab_report::{show_lab_report, upload_lab_report};
pub use score_api::score_sleep;

/// Unknown paths land back on the dashboard
pub async fn redirect_home() -> Redirect {
    Redirect::to("/")
}
