use culinary_ai::api_connection::{ApiConnectionError, CompletionPrompt, Provider};
use culinary_ai::config::{GEMINI_API_KEY_ENV_VAR, OPENROUTER_API_KEY_ENV_VAR};
use culinary_ai::recipe_parser::DishIdentification;
use culinary_ai::recipe_provider::{
    recipes_from_image, LlmRecipeProvider, ProviderError, RecipeProvider,
};
use dotenv::dotenv;
use reqwest::Client;
use std::env;

const MISSING_KEY_ENV_VAR: &str = "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ";

fn setup_test_environment() {
    dotenv().ok();
}

fn live_provider() -> Option<Provider> {
    setup_test_environment();
    if env::var(OPENROUTER_API_KEY_ENV_VAR).is_ok() {
        Some(Provider::openrouter(OPENROUTER_API_KEY_ENV_VAR, None))
    } else if env::var(GEMINI_API_KEY_ENV_VAR).is_ok() {
        Some(Provider::gemini(GEMINI_API_KEY_ENV_VAR, None))
    } else {
        println!(
            "Skipping live test: neither {} nor {} is set.",
            OPENROUTER_API_KEY_ENV_VAR, GEMINI_API_KEY_ENV_VAR
        );
        None
    }
}

#[tokio::test]
async fn test_missing_api_key_error() {
    setup_test_environment();
    let client = Client::new();

    for provider in [
        Provider::openrouter(MISSING_KEY_ENV_VAR, None),
        Provider::gemini(MISSING_KEY_ENV_VAR, None),
    ] {
        let result = provider
            .complete(&client, &CompletionPrompt::text("Hello"))
            .await;
        match result {
            Err(ApiConnectionError::MissingApiKey(key_name)) => {
                assert_eq!(key_name, MISSING_KEY_ENV_VAR)
            }
            other => panic!("expected a missing key error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_missing_api_key_is_a_transport_failure() {
    setup_test_environment();
    let provider = LlmRecipeProvider::new(Provider::openrouter(MISSING_KEY_ENV_VAR, None));

    let generated = provider
        .generate("chicken, broccoli, rice".to_string(), "high protein".to_string())
        .await;
    assert!(matches!(generated, Err(ProviderError::Transport(_))));

    let from_image = recipes_from_image(&provider, vec![0xFF, 0xD8, 0xFF]).await;
    assert!(matches!(from_image, Err(ProviderError::Transport(_))));
}

#[tokio::test]
#[ignore]
async fn test_live_generation_returns_displayable_recipes() {
    let Some(provider) = live_provider() else {
        return;
    };
    let provider = LlmRecipeProvider::new(provider);

    let recipes = provider
        .generate("chicken, broccoli, rice".to_string(), "high protein".to_string())
        .await
        .expect("generation failed");

    assert!(!recipes.is_empty());
    assert!(recipes.len() <= 5);
    for recipe in &recipes {
        assert!(recipe.is_displayable(), "not displayable: {:?}", recipe);
    }
}

#[tokio::test]
#[ignore]
async fn test_live_off_topic_request_returns_nothing() {
    let Some(provider) = live_provider() else {
        return;
    };
    let provider = LlmRecipeProvider::new(provider);

    let result = provider
        .generate("1 kilometer".to_string(), "book a ticket".to_string())
        .await;

    match result {
        Ok(recipes) => assert!(recipes.is_empty(), "got {:?}", recipes),
        Err(ProviderError::Unparseable(_)) => {}
        Err(e) => panic!("transport failure: {}", e),
    }
}

#[tokio::test]
#[ignore]
async fn test_live_identification_of_non_food() {
    let Some(provider) = live_provider() else {
        return;
    };
    let provider = LlmRecipeProvider::new(provider);
    // 1x1 white PNG
    let png: Vec<u8> = vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0xFF, 0xFF, 0x3F, 0x00, 0x05, 0xFE, 0x02, 0xFE, 0xA7, 0x35, 0x81, 0x84, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    let identification = provider
        .identify_dish(png)
        .await
        .expect("identification failed");
    assert_eq!(identification, DishIdentification::NotFood);
}
