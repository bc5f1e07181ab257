//! HTTP handlers for the recipe relay.

pub mod analyze;
pub mod app;
pub mod metrics;
