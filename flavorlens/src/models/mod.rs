//! Domain models and wire DTOs for the recipe relay.

pub mod analyze;
pub mod recipe;

pub use analyze::{AnalyzeRequest, AnalyzeResponse, DEFAULT_MIME_TYPE};
pub use recipe::Recipe;
