use super::ClientError;
use crate::models::Recipe;

/// How an error should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The image showed no food. The user fixes this by choosing another photo.
    NoFood,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ClientError> for ErrorNotice {
    fn from(err: &ClientError) -> Self {
        let kind = match err {
            ClientError::NoFood(_) => ErrorKind::NoFood,
            _ => ErrorKind::General,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Everything an upload/display front end renders.
///
/// Dropping a file starts an analysis straight away, so one upload is one
/// `begin_upload` followed by one `finish`.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    image_preview: Option<String>,
    loading: bool,
    error: Option<ErrorNotice>,
    recipes: Vec<Recipe>,
    selected: Option<usize>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new image was chosen: show it and forget the previous results.
    pub fn begin_upload(&mut self, preview: String) {
        self.image_preview = Some(preview);
        self.error = None;
        self.recipes.clear();
        self.selected = None;
        self.loading = true;
    }

    /// The analysis finished, one way or the other.
    pub fn finish(&mut self, outcome: Result<Vec<Recipe>, ClientError>) {
        self.loading = false;
        match outcome {
            Ok(recipes) => {
                self.error = None;
                self.recipes = recipes;
            }
            Err(err) => {
                self.error = Some(ErrorNotice::from(&err));
                self.recipes.clear();
            }
        }
    }

    /// Open the detail view for a recipe. Out-of-range indexes are ignored.
    pub fn select(&mut self, index: usize) -> Option<&Recipe> {
        if index < self.recipes.len() {
            self.selected = Some(index);
        }
        self.selected_recipe()
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn image_preview(&self) -> Option<&str> {
        self.image_preview.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        self.selected.and_then(|i| self.recipes.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(name: &str) -> Recipe {
        Recipe {
            recipe_name: name.to_string(),
            description: "d".to_string(),
            main_ingredients: vec!["x".to_string()],
            instructions: vec!["y".to_string()],
            time: "5 minutes".to_string(),
        }
    }

    #[test]
    fn upload_clears_previous_results_and_starts_loading() {
        let mut state = ViewState::new();
        state.begin_upload("data:image/png;base64,AA==".into());
        state.finish(Ok(vec![recipe("A"), recipe("B")]));
        state.select(1);

        state.begin_upload("data:image/png;base64,BB==".into());

        assert!(state.is_loading());
        assert!(state.recipes().is_empty());
        assert!(state.selected_recipe().is_none());
        assert!(state.error().is_none());
        assert_eq!(state.image_preview(), Some("data:image/png;base64,BB=="));
    }

    #[test]
    fn success_stores_recipes() {
        let mut state = ViewState::new();
        state.begin_upload("p".into());
        state.finish(Ok(vec![recipe("A")]));

        assert!(!state.is_loading());
        assert_eq!(state.recipes().len(), 1);
    }

    #[test]
    fn no_food_gets_its_own_error_kind() {
        let mut state = ViewState::new();
        state.begin_upload("p".into());
        state.finish(Err(ClientError::NoFood("Not food".into())));

        let notice = state.error().unwrap();
        assert_eq!(notice.kind, ErrorKind::NoFood);
        assert_eq!(notice.message, "Not food");
        assert!(!state.is_loading());
    }

    #[test]
    fn relay_errors_are_general() {
        let mut state = ViewState::new();
        state.begin_upload("p".into());
        state.finish(Err(ClientError::Relay {
            status: 429,
            message: "busy".into(),
        }));

        assert_eq!(state.error().unwrap().kind, ErrorKind::General);
    }

    #[test]
    fn select_ignores_out_of_range() {
        let mut state = ViewState::new();
        state.finish(Ok(vec![recipe("A")]));

        assert!(state.select(3).is_none());
        assert_eq!(state.select(0).unwrap().recipe_name, "A");
        state.close_detail();
        assert!(state.selected_recipe().is_none());
    }
}
