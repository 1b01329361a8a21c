pub mod scoring;
pub mod suggestions;
pub mod validation;

// Domain services
// Backend access, input validation and the static alert advice table.

// Re-export service traits and factory functions
pub use scoring::{
    create_default_scoring_service, BackendCall, HttpScoringClient, ScoringClientError, ScoringServiceTrait,
};
pub use suggestions::suggestion_for;
pub use validation::validate_metrics;

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use scoring::create_mock_scoring_service;
