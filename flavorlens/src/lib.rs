//! FlavorLens: recipe suggestions from a food photo.
//!
//! The relay (`startup`, `handlers`, `services`) forwards an uploaded image
//! to a multimodal model and validates the recipes it returns. The `client`
//! module is the matching upload/display side for Rust callers.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
