use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::recipe::Recipe;

/// File name of the single storage slot holding the favorites.
pub const FAVORITES_SLOT: &str = "recipeFavorites.json";

/// Saved recipes keyed by title, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesSet {
    recipes: Vec<Recipe>,
}

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from a list, keeping the first recipe for each title.
    pub fn from_recipes(recipes: Vec<Recipe>) -> Self {
        let mut set = Self::new();
        for recipe in recipes {
            if !set.contains(&recipe.title) {
                set.recipes.push(recipe);
            }
        }
        set
    }

    pub fn contains(&self, title: &str) -> bool {
        self.recipes.iter().any(|fav| fav.title == title)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Returns `set` with `recipe` removed if its title is present, appended otherwise.
pub fn toggle(set: &FavoritesSet, recipe: &Recipe) -> FavoritesSet {
    let recipes = if set.contains(&recipe.title) {
        set.recipes
            .iter()
            .filter(|fav| fav.title != recipe.title)
            .cloned()
            .collect()
    } else {
        let mut recipes = set.recipes.clone();
        recipes.push(recipe.clone());
        recipes
    };
    FavoritesSet { recipes }
}

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("favorites I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("favorites data is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for the favorites set.
///
/// Implementors report failures through `read`/`write`; callers go through
/// `load`/`save`, which log failures and never pass them on.
pub trait FavoritesStore {
    fn read(&self) -> Result<FavoritesSet, FavoritesError>;

    fn write(&self, favorites: &FavoritesSet) -> Result<(), FavoritesError>;

    /// Loads the persisted set, or an empty one if it cannot be read.
    fn load(&self) -> FavoritesSet {
        match self.read() {
            Ok(favorites) => {
                debug!("Loaded {} favorites", favorites.len());
                favorites
            }
            Err(e) => {
                warn!("Could not load favorites, starting empty: {}", e);
                FavoritesSet::new()
            }
        }
    }

    /// Persists the whole set. Failures are logged and otherwise ignored.
    fn save(&self, favorites: &FavoritesSet) {
        if let Err(e) = self.write(favorites) {
            error!("Could not save favorites: {}", e);
        }
    }
}

/// Favorites kept as a JSON array in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> FavoritesError {
        FavoritesError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl FavoritesStore for JsonFileStore {
    fn read(&self) -> Result<FavoritesSet, FavoritesError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FavoritesSet::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        let recipes: Vec<Recipe> = serde_json::from_str(&contents)?;
        Ok(FavoritesSet::from_recipes(recipes))
    }

    fn write(&self, favorites: &FavoritesSet) -> Result<(), FavoritesError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(favorites)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{IngredientLine, Nutrition, NutritionValue, Servings};
    use tempfile::tempdir;

    fn recipe(title: &str) -> Recipe {
        Recipe {
            title: title.to_string(),
            description: format!("{} for dinner", title),
            servings: Servings::Count(2),
            nutrition: Nutrition {
                calories: Some(NutritionValue::Amount(400.0)),
                protein: Some(NutritionValue::Text("30g".to_string())),
                ..Nutrition::default()
            },
            ingredients: vec![
                IngredientLine::Measured {
                    quantity: "1 cup".to_string(),
                    item: "rice".to_string(),
                },
                IngredientLine::Plain("salt".to_string()),
            ],
            instructions: vec!["Cook".to_string()],
            ..Recipe::default()
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let empty = FavoritesSet::new();
        let added = toggle(&empty, &recipe("Curry"));
        assert_eq!(added.len(), 1);
        assert!(added.contains("Curry"));

        let removed = toggle(&added, &recipe("Curry"));
        assert!(removed.is_empty());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_toggle_matches_by_title_only() {
        let set = toggle(&FavoritesSet::new(), &recipe("Curry"));
        let mut variant = recipe("Curry");
        variant.description = "a different description".to_string();

        assert!(toggle(&set, &variant).is_empty());
    }

    #[test]
    fn test_toggle_preserves_order() {
        let set = ["A", "B", "C"]
            .iter()
            .fold(FavoritesSet::new(), |set, title| toggle(&set, &recipe(title)));
        let set = toggle(&set, &recipe("B"));

        let titles: Vec<_> = set.recipes().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn test_from_recipes_collapses_duplicate_titles() {
        let set = FavoritesSet::from_recipes(vec![recipe("A"), recipe("A"), recipe("B")]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join(FAVORITES_SLOT));
        let set = toggle(&toggle(&FavoritesSet::new(), &recipe("A")), &recipe("B"));

        store.save(&set);
        assert_eq!(store.load(), set);

        store.save(&FavoritesSet::new());
        assert_eq!(store.load(), FavoritesSet::new());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join(FAVORITES_SLOT));
        assert!(store.read().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(FAVORITES_SLOT);
        fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);

        assert!(matches!(store.read(), Err(FavoritesError::Serialization(_))));
        assert!(store.load().is_empty());

        fs::write(&path, r#"{"title": "not a list"}"#).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        // The slot path is an existing directory, so the write fails.
        let store = JsonFileStore::new(dir.path());
        let set = toggle(&FavoritesSet::new(), &recipe("A"));

        assert!(store.write(&set).is_err());
        store.save(&set);
    }
}
