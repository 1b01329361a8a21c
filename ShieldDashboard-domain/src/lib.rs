// SHIELD Dashboard Domain
// This crate contains the business logic for the SHIELD sleep dashboard

// Backend configuration
pub mod config;

// Domain entities
pub mod entities;

// Dashboard form state and field errors
pub mod forms;

// Health checks and system status
pub mod health;

// Per-session page flows
pub mod page;

// Display-ready view models
pub mod render;

// Services that implement business logic
pub mod services;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
