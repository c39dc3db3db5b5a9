use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::app_state::AppState;
use crate::favorites::FavoritesStore;
use crate::recipe::Recipe;
use crate::recipe_provider::{recipes_from_image, ImageRecipes, ProviderError, RecipeProvider};
use crate::renderer::ViewRenderer;

pub const GENERATING_MESSAGE: &str = "Generating recipe ideas...";
pub const IDENTIFYING_MESSAGE: &str = "Identifying your dish...";

pub const NO_RECIPES_ERROR: &str =
    "Could not generate recipes. The request may be off-topic or too specific.";
pub const GENERATION_FAILED_ERROR: &str = "An error occurred while generating recipes.";
pub const NOT_FOOD_ERROR: &str = "Could not identify a food dish from the image.";
pub const IMAGE_FAILED_ERROR: &str = "An error occurred processing the image.";

pub fn no_recipes_for_dish_error(dish: &str) -> String {
    format!("Could not find recipes for \"{}\".", dish)
}

#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// Something the user asked for.
#[derive(Debug, Clone)]
pub enum Intent {
    Generate { ingredients: String, goals: String },
    UploadImage(ImageSource),
    SelectRecipe(Recipe),
    ToggleFavorite(Recipe),
    Back,
    NavigateHome,
    NavigateFavorites,
    DismissError,
}

/// Owns the application state and mediates every change to it.
///
/// Intents are dispatched through `&mut self`, so a request in flight runs to
/// completion before the next intent is looked at.
pub struct App<P, S, R> {
    state: AppState,
    provider: P,
    store: S,
    renderer: R,
    error_display: Duration,
}

impl<P, S, R> App<P, S, R>
where
    P: RecipeProvider,
    S: FavoritesStore,
    R: ViewRenderer,
{
    /// Loads the favorites from `store` and renders the initial view.
    pub fn new(provider: P, store: S, renderer: R, error_display: Duration) -> Self {
        let favorites = store.load();
        let mut app = Self {
            state: AppState::new(favorites),
            provider,
            store,
            renderer,
            error_display,
        };
        app.render();
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn render(&mut self) {
        self.renderer.render(&self.state);
    }

    pub async fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::Generate { ingredients, goals } => self.generate(ingredients, goals).await,
            Intent::UploadImage(source) => self.upload_image(source).await,
            Intent::SelectRecipe(recipe) => {
                if self.state.select(recipe) {
                    self.render();
                }
            }
            Intent::ToggleFavorite(recipe) => self.toggle_favorite(&recipe),
            Intent::Back => {
                if self.state.back() {
                    self.render();
                }
            }
            Intent::NavigateHome => {
                self.state.navigate_home();
                self.render();
            }
            Intent::NavigateFavorites => {
                self.state.navigate_favorites();
                self.render();
            }
            Intent::DismissError => {
                if self.state.dismiss_error() {
                    self.render();
                }
            }
        }
    }

    /// Clears the banner if its deadline has passed by `now`.
    pub fn expire_error(&mut self, now: Instant) {
        if self.state.expire_error(now) {
            self.render();
        }
    }

    fn fail(&mut self, message: &str) {
        self.state.fail(message, Instant::now(), self.error_display);
        self.render();
    }

    async fn generate(&mut self, ingredients: String, goals: String) {
        if !self.state.begin_loading(GENERATING_MESSAGE) {
            return;
        }
        self.render();

        match self.provider.generate(ingredients, goals).await {
            Ok(recipes) if !recipes.is_empty() => {
                self.state.show_results(recipes);
                self.render();
            }
            Ok(_) | Err(ProviderError::Unparseable(_)) => self.fail(NO_RECIPES_ERROR),
            Err(e) => {
                error!("Error generating recipes: {}", e);
                self.fail(GENERATION_FAILED_ERROR);
            }
        }
    }

    async fn upload_image(&mut self, source: ImageSource) {
        if !self.state.begin_loading(IDENTIFYING_MESSAGE) {
            return;
        }
        self.render();

        let image = match source {
            ImageSource::Bytes(bytes) => bytes,
            ImageSource::File(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!("Could not read image {}: {}", path.display(), e);
                    self.fail(IMAGE_FAILED_ERROR);
                    return;
                }
            },
        };

        match recipes_from_image(&self.provider, image).await {
            Ok(ImageRecipes::NotFood) => self.fail(NOT_FOOD_ERROR),
            Ok(ImageRecipes::Dish { name, recipes }) if recipes.is_empty() => {
                self.fail(&no_recipes_for_dish_error(&name))
            }
            Ok(ImageRecipes::Dish { recipes, .. }) => {
                self.state.show_results(recipes);
                self.render();
            }
            Err(e) => {
                error!("Error in image processing flow: {}", e);
                self.fail(IMAGE_FAILED_ERROR);
            }
        }
    }

    fn toggle_favorite(&mut self, recipe: &Recipe) {
        if let Some(favorites) = self.state.toggle_favorite(recipe) {
            info!(
                "Toggled favorite '{}' ({} saved)",
                recipe.title,
                favorites.len()
            );
            self.store.save(favorites);
            self.render();
        }
    }
}
