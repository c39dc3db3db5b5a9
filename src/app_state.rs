use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::favorites::{toggle, FavoritesSet};
use crate::recipe::Recipe;

pub const DEFAULT_LOADING_MESSAGE: &str = "Your personal chef is thinking...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Initial,
    Loading,
    Results,
    Favorites,
    Detail,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Initial => "initial",
            View::Loading => "loading",
            View::Results => "results",
            View::Favorites => "favorites",
            View::Detail => "detail",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Success,
}

/// The transient banner. It is cleared once `expires_at` has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBanner {
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

/// Everything the views display. Mutated only by its own transition methods.
#[derive(Debug, Clone)]
pub struct AppState {
    view: View,
    results: Vec<Recipe>,
    selected: Option<Recipe>,
    favorites: FavoritesSet,
    error: Option<ErrorBanner>,
    loading_message: String,
}

impl AppState {
    pub fn new(favorites: FavoritesSet) -> Self {
        Self {
            view: View::Initial,
            results: Vec::new(),
            selected: None,
            favorites,
            error: None,
            loading_message: DEFAULT_LOADING_MESSAGE.to_string(),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn results(&self) -> &[Recipe] {
        &self.results
    }

    pub fn selected(&self) -> Option<&Recipe> {
        self.selected.as_ref()
    }

    pub fn favorites(&self) -> &FavoritesSet {
        &self.favorites
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn loading_message(&self) -> &str {
        &self.loading_message
    }

    pub fn is_favorite(&self, recipe: &Recipe) -> bool {
        self.favorites.contains(&recipe.title)
    }

    /// Recipes listed by the current view, in display order.
    pub fn visible_recipes(&self) -> &[Recipe] {
        match self.view {
            View::Results => &self.results,
            View::Favorites => self.favorites.recipes(),
            _ => &[],
        }
    }

    fn set_view(&mut self, view: View) {
        if self.view != view {
            info!("View: {} -> {}", self.view, view);
        }
        self.view = view;
    }

    /// Enters the loading view. Requests start only from the initial view.
    pub fn begin_loading(&mut self, message: &str) -> bool {
        if self.view != View::Initial {
            debug!("Ignoring request in {} view", self.view);
            return false;
        }
        self.loading_message = message.to_string();
        self.set_view(View::Loading);
        true
    }

    /// Replaces the result list and shows it. An empty list is a failure and
    /// belongs in [`AppState::fail`] instead.
    pub fn show_results(&mut self, recipes: Vec<Recipe>) {
        debug_assert!(!recipes.is_empty());
        self.results = recipes;
        self.set_view(View::Results);
    }

    /// Surfaces `message` and returns to the initial view.
    pub fn fail(&mut self, message: &str, now: Instant, display_for: Duration) {
        self.show_error(message, Severity::Error, now, display_for);
        self.set_view(View::Initial);
    }

    /// Opens the detail view. Only list views can select.
    pub fn select(&mut self, recipe: Recipe) -> bool {
        if !matches!(self.view, View::Results | View::Favorites) {
            debug!("Ignoring select in {} view", self.view);
            return false;
        }
        self.selected = Some(recipe);
        self.set_view(View::Detail);
        true
    }

    pub fn back(&mut self) -> bool {
        if self.view != View::Detail {
            debug!("Ignoring back in {} view", self.view);
            return false;
        }
        let target = if self.results.is_empty() {
            View::Initial
        } else {
            View::Results
        };
        self.set_view(target);
        true
    }

    pub fn navigate_home(&mut self) {
        self.set_view(View::Initial);
    }

    pub fn navigate_favorites(&mut self) {
        self.set_view(View::Favorites);
    }

    /// Toggles `recipe` in the favorites. Returns the new set for persisting,
    /// or `None` when the current view shows no recipe.
    pub fn toggle_favorite(&mut self, recipe: &Recipe) -> Option<&FavoritesSet> {
        if !matches!(self.view, View::Results | View::Favorites | View::Detail) {
            debug!("Ignoring favorite toggle in {} view", self.view);
            return None;
        }
        self.favorites = toggle(&self.favorites, recipe);
        Some(&self.favorites)
    }

    /// Shows a banner until `now + display_for`, replacing any current one.
    pub fn show_error(
        &mut self,
        message: &str,
        severity: Severity,
        now: Instant,
        display_for: Duration,
    ) {
        self.error = Some(ErrorBanner {
            message: message.to_string(),
            severity,
            expires_at: now + display_for,
        });
    }

    pub fn dismiss_error(&mut self) -> bool {
        self.error.take().is_some()
    }

    /// Clears the banner if its deadline has passed. Returns whether it did.
    pub fn expire_error(&mut self, now: Instant) -> bool {
        match &self.error {
            Some(banner) if banner.expires_at <= now => {
                self.error = None;
                true
            }
            _ => false,
        }
    }

    pub fn error_deadline(&self) -> Option<Instant> {
        self.error.as_ref().map(|banner| banner.expires_at)
    }
}
