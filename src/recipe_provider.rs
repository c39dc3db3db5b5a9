use reqwest::Client;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api_connection::{ApiConnectionError, CompletionPrompt, InlineImage, Provider};
use crate::recipe::Recipe;
use crate::recipe_parser::{
    parse_dish_identification, parse_recipe_response, DishIdentification, RecipeParseError,
    MAX_RECIPES, NOT_FOOD,
};

/// Goals sent along with an identified dish name.
pub const VARIATIONS_GOALS: &str = "provide the classic recipe, plus 4 popular variations.";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] ApiConnectionError),
    #[error(transparent)]
    Unparseable(#[from] RecipeParseError),
}

/// The AI boundary: recipes from text, dish names from images.
pub trait RecipeProvider: Send + Sync {
    fn generate(
        &self,
        ingredients: String,
        goals: String,
    ) -> impl Future<Output = Result<Vec<Recipe>, ProviderError>> + Send;

    fn identify_dish(
        &self,
        image: Vec<u8>,
    ) -> impl Future<Output = Result<DishIdentification, ProviderError>> + Send;
}

/// Result of the photo flow once the dish has been looked at.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRecipes {
    NotFood,
    Dish { name: String, recipes: Vec<Recipe> },
}

/// Identifies the dish in `image` and, if it is food, asks for its recipes.
///
/// An unparseable recipe answer for an identified dish is reported as a dish
/// with no recipes.
pub async fn recipes_from_image<P: RecipeProvider>(
    provider: &P,
    image: Vec<u8>,
) -> Result<ImageRecipes, ProviderError> {
    let name = match provider.identify_dish(image).await? {
        DishIdentification::NotFood => return Ok(ImageRecipes::NotFood),
        DishIdentification::Dish(name) => name,
    };
    info!("Identified dish: {}", name);

    let recipes = match provider
        .generate(name.clone(), VARIATIONS_GOALS.to_string())
        .await
    {
        Ok(recipes) => recipes,
        Err(ProviderError::Unparseable(e)) => {
            warn!("Recipes for '{}' could not be parsed: {}", name, e);
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    Ok(ImageRecipes::Dish { name, recipes })
}

pub fn recipe_prompt(ingredients: &str, goals: &str) -> String {
    format!(
        "You are a recipe generation assistant and you only provide recipes. \
If the request below is not about food or cooking (for example '1 kilometer' or 'book a ticket'), \
respond with an empty JSON array [].
Otherwise, using these ingredients: \"{ingredients}\", and these goals: \"{goals}\", \
suggest up to {max} common and popular recipes.
Respond with a JSON array only, with no explanatory text and no markdown.
Every recipe object MUST include all of these fields:
- \"title\": string
- \"description\": string
- \"difficulty\": string
- \"time\": string
- \"servings\": number or string
- \"budget\": string
- \"nutrition\": object with \"calories\", \"protein\", \"carbs\" and \"fats\"
- \"ingredients\": array of objects with \"quantity\" and \"item\"
- \"instructions\": array of strings",
        ingredients = ingredients,
        goals = goals,
        max = MAX_RECIPES,
    )
}

pub fn identification_prompt() -> String {
    format!(
        "You are a food identification assistant. Is this an image of food? \
If yes, respond with ONLY the name of the dish. \
If not, or if you are unsure, respond with the single word {}.",
        NOT_FOOD
    )
}

/// Best-effort MIME type from the leading magic bytes.
pub fn sniff_image_mime(data: &[u8]) -> &'static str {
    match data {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

/// [`RecipeProvider`] backed by an HTTP LLM backend.
#[derive(Debug, Clone)]
pub struct LlmRecipeProvider {
    provider: Provider,
    client: Client,
}

impl LlmRecipeProvider {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            client: Client::new(),
        }
    }
}

impl RecipeProvider for LlmRecipeProvider {
    async fn generate(
        &self,
        ingredients: String,
        goals: String,
    ) -> Result<Vec<Recipe>, ProviderError> {
        info!(
            "Requesting recipes from {} (ingredients: '{}', goals: '{}')",
            self.provider.model(),
            ingredients,
            goals
        );
        let prompt = CompletionPrompt::text(recipe_prompt(&ingredients, &goals)).expect_json();
        let content = self.provider.complete(&self.client, &prompt).await?;
        debug!("Raw recipe response:\n{}", content);

        let recipes = parse_recipe_response(&content)?;
        info!("Provider returned {} displayable recipes", recipes.len());
        Ok(recipes)
    }

    async fn identify_dish(&self, image: Vec<u8>) -> Result<DishIdentification, ProviderError> {
        let mime_type = sniff_image_mime(&image).to_string();
        info!(
            "Identifying dish from {} byte {} image",
            image.len(),
            mime_type
        );
        let prompt = CompletionPrompt::text(identification_prompt()).with_image(InlineImage {
            mime_type,
            data: image,
        });
        let content = self.provider.complete(&self.client, &prompt).await?;
        debug!("Raw identification response: {}", content);

        Ok(parse_dish_identification(&content))
    }
}
