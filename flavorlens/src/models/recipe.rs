use serde::{Deserialize, Serialize};

/// A recipe suggestion produced by the upstream model.
///
/// Recipes are ephemeral: built per request from model output and never
/// stored. Their only identity is their position in the returned list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub recipe_name: String,
    pub description: String,
    pub main_ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Free-form estimate such as "25 minutes".
    pub time: String,
}

impl Recipe {
    /// Deserialization already enforces the field shapes; this rejects the
    /// blank strings a model sometimes emits for fields it could not fill.
    pub fn is_complete(&self) -> bool {
        !self.recipe_name.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.time.trim().is_empty()
    }
}
