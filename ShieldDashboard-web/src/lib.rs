// ShieldDashboard-web lib.rs
//
// Server-rendered SHIELD sleep dashboard and lab report pages,
// plus a small JSON API over the same scoring backend.

// Public modules
pub mod api;
pub mod config;
pub mod entities;
pub mod openapi;
pub mod pages;
