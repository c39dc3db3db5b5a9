use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::recipe::Recipe;

/// Upper bound on recipes accepted from a single generation call.
pub const MAX_RECIPES: usize = 5;

/// Token the identification prompt asks for when the image is not food.
pub const NOT_FOOD: &str = "NOT_FOOD";

#[derive(Debug, Error)]
pub enum RecipeParseError {
    #[error("recipe response is not valid JSON: {source}")]
    Unparseable {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

/// Outcome of the image identification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DishIdentification {
    Dish(String),
    NotFood,
}

/// Strips a surrounding markdown code fence (```` ```json ````, any case, or bare ```` ``` ````).
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.ends_with("```") {
        return trimmed;
    }
    let json_tag = "```json";
    if let Some(inner) = trimmed
        .get(..json_tag.len())
        .filter(|tag| tag.eq_ignore_ascii_case(json_tag))
        .map(|_| &trimmed[json_tag.len()..])
    {
        return inner.trim_end_matches("```").trim();
    }
    if let Some(inner) = trimmed.strip_prefix("```") {
        return inner.trim_end_matches("```").trim();
    }
    trimmed
}

/// Turns the provider's raw text into displayable recipes.
///
/// Text that is not JSON at all is an error. An object holding exactly one
/// array is read as that array; any other JSON that is not an array yields
/// no recipes, as do elements that are not objects or that lack a
/// title or instructions. At most [`MAX_RECIPES`] are kept.
pub fn parse_recipe_response(content: &str) -> Result<Vec<Recipe>, RecipeParseError> {
    let cleaned = strip_code_fences(content);

    let value: Value = serde_json::from_str(cleaned).map_err(|source| {
        warn!("Failed to parse recipe response: {}", source);
        RecipeParseError::Unparseable {
            source,
            raw: content.to_string(),
        }
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match single_array_field(map) {
            Some(items) => items,
            None => {
                debug!("Recipe response is an object without a single recipe list");
                return Ok(Vec::new());
            }
        },
        other => {
            debug!("Recipe response is JSON but not an array: {}", other);
            return Ok(Vec::new());
        }
    };

    let received = items.len();
    let recipes: Vec<Recipe> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value::<Recipe>(item).ok())
        .filter(Recipe::is_displayable)
        .take(MAX_RECIPES)
        .collect();

    if recipes.len() < received {
        debug!(
            "Kept {} of {} recipes from provider response",
            recipes.len(),
            received
        );
    }
    Ok(recipes)
}

/// Unwraps `{"recipes": [...]}`: an object whose only array-valued field is the list.
fn single_array_field(map: serde_json::Map<String, Value>) -> Option<Vec<Value>> {
    let mut arrays = map.into_iter().filter_map(|(_, value)| match value {
        Value::Array(items) => Some(items),
        _ => None,
    });
    let items = arrays.next()?;
    arrays.next().is_none().then_some(items)
}

/// Reads the identification answer: a bare dish name, or the `NOT_FOOD` token.
pub fn parse_dish_identification(content: &str) -> DishIdentification {
    let name = content
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim_end_matches('.')
        .trim();

    if name.is_empty() || name.eq_ignore_ascii_case(NOT_FOOD) {
        DishIdentification::NotFood
    } else {
        DishIdentification::Dish(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECIPES: &str = r#"[
        {
            "title": "Chicken and Broccoli Rice Bowl",
            "description": "High protein bowl",
            "difficulty": "Easy",
            "time": "30 minutes",
            "servings": 2,
            "budget": "Low",
            "nutrition": { "calories": 520, "protein": 45, "carbs": 50, "fats": 12 },
            "ingredients": [{ "quantity": "300g", "item": "chicken breast" }],
            "instructions": ["Cook the rice", "Sear the chicken", "Steam the broccoli"]
        },
        {
            "title": "Broken Casserole",
            "description": "No steps",
            "ingredients": []
        }
    ]"#;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  [2]  "), "[2]");
        assert_eq!(strip_code_fences("```json [3]"), "```json [3]");
        assert_eq!(strip_code_fences("```JSON\n[4]\n```"), "[4]");
        assert_eq!(parse_recipe_response("```Json\n[]\n```").unwrap().len(), 0);
    }

    #[test]
    fn test_recipes_without_instructions_are_dropped() {
        let recipes = parse_recipe_response(TWO_RECIPES).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].title, "Chicken and Broccoli Rice Bowl");
    }

    #[test]
    fn test_fenced_response_is_parsed() {
        let fenced = format!("```json\n{}\n```", TWO_RECIPES);
        assert_eq!(parse_recipe_response(&fenced).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_array_means_no_recipes() {
        assert!(parse_recipe_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_non_array_json_means_no_recipes() {
        let recipes = parse_recipe_response(r#"{"title": "Pancakes", "instructions": ["Mix"]}"#)
            .unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_object_wrapping_one_list_is_unwrapped() {
        let recipes = parse_recipe_response(
            r#"{"recipes": [{"title": "Bowl", "instructions": ["Cook"]}], "note": "enjoy"}"#,
        )
        .unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].title, "Bowl");

        assert!(parse_recipe_response(r#"{"recipes": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_object_with_several_lists_means_no_recipes() {
        let recipes = parse_recipe_response(
            r#"{"a": [{"title": "Bowl", "instructions": ["Cook"]}], "b": []}"#,
        )
        .unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_non_object_elements_are_dropped() {
        let recipes = parse_recipe_response(
            r#"[null, "Pancakes", 3, {"title": "Pancakes", "instructions": ["Mix", "Fry"]}]"#,
        )
        .unwrap();
        assert_eq!(recipes.len(), 1);
    }

    #[test]
    fn test_untitled_recipes_are_dropped() {
        let recipes =
            parse_recipe_response(r#"[{"title": "", "instructions": ["Mix"]}, {"instructions": ["Mix"]}]"#)
                .unwrap();
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_result_is_capped() {
        let many: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"title": "Dish {}", "instructions": ["Cook"]}}"#, i))
            .collect();
        let recipes = parse_recipe_response(&format!("[{}]", many.join(","))).unwrap();
        assert_eq!(recipes.len(), MAX_RECIPES);
        assert_eq!(recipes[4].title, "Dish 4");
    }

    #[test]
    fn test_malformed_response_is_unparseable() {
        let err = parse_recipe_response("Sure! Here are some recipes:").unwrap_err();
        match err {
            RecipeParseError::Unparseable { raw, .. } => {
                assert_eq!(raw, "Sure! Here are some recipes:")
            }
        }
        assert!(parse_recipe_response("").is_err());
    }

    #[test]
    fn test_dish_identification() {
        assert_eq!(
            parse_dish_identification("  Pad Thai\n"),
            DishIdentification::Dish("Pad Thai".to_string())
        );
        assert_eq!(
            parse_dish_identification("\"Margherita Pizza.\""),
            DishIdentification::Dish("Margherita Pizza".to_string())
        );
        assert_eq!(parse_dish_identification("NOT_FOOD"), DishIdentification::NotFood);
        assert_eq!(parse_dish_identification("not_food."), DishIdentification::NotFood);
        assert_eq!(parse_dish_identification("   "), DishIdentification::NotFood);
    }
}
