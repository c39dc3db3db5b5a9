use std::fmt::Write as _;
use std::io::{self, Write};

use crate::app_state::{AppState, Severity, View};
use crate::recipe::Recipe;

/// Presents the application state. Renderers never mutate it.
pub trait ViewRenderer {
    fn render(&mut self, state: &AppState);
}

/// Prints each state to a writer as plain text.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ViewRenderer for TerminalRenderer<W> {
    fn render(&mut self, state: &AppState) {
        if let Err(e) = self
            .out
            .write_all(format_view(state).as_bytes())
            .and_then(|_| self.out.flush())
        {
            tracing::warn!("Failed to write view: {}", e);
        }
    }
}

const RULE: &str = "------------------------------------------------------------";

/// Text for the whole screen: header, banner, then the current view.
pub fn format_view(state: &AppState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}\n Culinary AI          [home] [favorites]\n{}", RULE, RULE);

    if let Some(banner) = state.error() {
        let marker = match banner.severity {
            Severity::Error => "!",
            Severity::Success => "ok",
        };
        let _ = writeln!(out, "[{}] {}   (dismiss)", marker, banner.message);
    }

    match state.view() {
        View::Initial => format_initial(&mut out),
        View::Loading => {
            let _ = writeln!(out, "\n{}\nPlease wait a moment...", state.loading_message());
        }
        View::Results => {
            let _ = writeln!(out, "\nHere are some ideas...\n");
            format_cards(&mut out, state, state.results());
        }
        View::Favorites => {
            let _ = writeln!(out, "\nMy Favorite Recipes\n");
            if state.favorites().is_empty() {
                let _ = writeln!(out, "No Favorites Yet");
                let _ = writeln!(out, "Use `fav <n>` on any recipe to save it here!");
            } else {
                format_cards(&mut out, state, state.favorites().recipes());
            }
        }
        View::Detail => match state.selected() {
            Some(recipe) => format_detail(&mut out, recipe, state.is_favorite(recipe)),
            None => {
                let _ = writeln!(out, "\nNo recipe selected.");
            }
        },
    }
    out
}

fn format_initial(out: &mut String) {
    let _ = writeln!(out, "\nYour Personal AI Chef");
    let _ = writeln!(
        out,
        "Describe the meal you want, or show me a photo of a dish you'd like to make!\n"
    );
    let _ = writeln!(out, "  generate <ingredients> | <goals>   e.g. generate chicken, broccoli, rice | high protein");
    let _ = writeln!(out, "  photo <path>                       get the recipe for a dish photo");
}

fn heart(favorited: bool) -> &'static str {
    if favorited {
        "<3"
    } else {
        "  "
    }
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

fn format_cards(out: &mut String, state: &AppState, recipes: &[Recipe]) {
    for (index, recipe) in recipes.iter().enumerate() {
        let nutrition = &recipe.nutrition;
        let _ = writeln!(
            out,
            "{:>2}. {} {}",
            index + 1,
            heart(state.is_favorite(recipe)),
            recipe.title
        );
        if !recipe.description.is_empty() {
            let _ = writeln!(out, "       {}", recipe.description);
        }
        let _ = writeln!(
            out,
            "       {} Calories | {}g Protein | {}g Fats",
            or_placeholder(nutrition.calories.as_ref().map(|v| v.to_string()), "?"),
            or_placeholder(nutrition.protein.as_ref().map(|v| v.to_string()), "?"),
            or_placeholder(nutrition.fats.as_ref().map(|v| v.to_string()), "?"),
        );
    }
    let _ = writeln!(out, "\n  open <n> | fav <n> | home | favorites");
}

fn format_detail(out: &mut String, recipe: &Recipe, favorited: bool) {
    let calories = recipe
        .nutrition
        .calories
        .as_ref()
        .map(|v| format!("{} kcal", v));
    let servings = (!recipe.servings.is_empty()).then(|| recipe.servings.to_string());

    let _ = writeln!(out, "\n< back                                   {}", heart(favorited));
    let _ = writeln!(out, "\n{}", recipe.title);
    let _ = writeln!(
        out,
        "{}\n",
        or_placeholder(Some(recipe.description.clone()), "No description available.")
    );
    let _ = writeln!(
        out,
        "Time: {}   Difficulty: {}   Calories: {}   Servings: {}",
        or_placeholder(Some(recipe.time.clone()), "N/A"),
        or_placeholder(Some(recipe.difficulty.clone()), "N/A"),
        or_placeholder(calories, "?"),
        or_placeholder(servings, "N/A"),
    );
    if !recipe.budget.is_empty() {
        let _ = writeln!(out, "Budget: {}", recipe.budget);
    }

    let _ = writeln!(out, "\nIngredients");
    if recipe.ingredients.is_empty() {
        let _ = writeln!(out, "  - No ingredients.");
    }
    for line in &recipe.ingredients {
        let _ = writeln!(out, "  - {}", line);
    }

    let _ = writeln!(out, "\nInstructions");
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", step + 1, instruction);
    }
    let _ = writeln!(out, "\n  back | fav | home | favorites");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FavoritesSet;
    use crate::recipe::{IngredientLine, Nutrition, NutritionValue};
    use std::time::{Duration, Instant};

    fn recipe(title: &str) -> Recipe {
        Recipe {
            title: title.to_string(),
            description: "Creamy and quick".to_string(),
            nutrition: Nutrition {
                calories: Some(NutritionValue::Amount(610.0)),
                protein: Some(NutritionValue::Amount(22.0)),
                ..Nutrition::default()
            },
            ingredients: vec![IngredientLine::Measured {
                quantity: "200g".to_string(),
                item: "spaghetti".to_string(),
            }],
            instructions: vec!["Boil pasta".to_string(), "Mix with eggs".to_string()],
            ..Recipe::default()
        }
    }

    #[test]
    fn test_results_cards_show_placeholders_and_hearts() {
        let mut state = AppState::new(FavoritesSet::from_recipes(vec![recipe("Carbonara")]));
        state.show_results(vec![recipe("Carbonara"), recipe("Cacio e Pepe")]);

        let text = format_view(&state);
        assert!(text.contains("Here are some ideas..."));
        assert!(text.contains(" 1. <3 Carbonara"));
        assert!(text.contains(" 2.    Cacio e Pepe"));
        assert!(text.contains("610 Calories | 22g Protein | ?g Fats"));
    }

    #[test]
    fn test_detail_lists_ingredients_and_steps() {
        let mut state = AppState::new(FavoritesSet::new());
        state.show_results(vec![recipe("Carbonara")]);
        state.select(recipe("Carbonara"));

        let text = format_view(&state);
        assert!(text.contains("Calories: 610 kcal"));
        assert!(text.contains("Time: N/A"));
        assert!(text.contains("Servings: N/A"));
        assert!(text.contains("  - 200g spaghetti"));
        assert!(text.contains("  2. Mix with eggs"));
    }

    #[test]
    fn test_empty_favorites_and_banner() {
        let mut state = AppState::new(FavoritesSet::new());
        state.navigate_favorites();
        state.show_error(
            "Could not identify a food dish from the image.",
            Severity::Error,
            Instant::now(),
            Duration::from_secs(5),
        );

        let text = format_view(&state);
        assert!(text.contains("No Favorites Yet"));
        assert!(text.contains("[!] Could not identify a food dish from the image."));
    }

    #[test]
    fn test_terminal_renderer_writes_loading_view() {
        let mut state = AppState::new(FavoritesSet::new());
        state.begin_loading("Identifying your dish...");
        let mut renderer = TerminalRenderer::new(Vec::new());

        renderer.render(&state);

        let written = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(written.contains("Identifying your dish...\nPlease wait a moment..."));
    }
}
