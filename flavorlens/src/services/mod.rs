pub mod analysis;
pub mod metrics;
pub mod providers;
pub mod recipe_parser;

pub use analysis::RecipeAnalyzer;
