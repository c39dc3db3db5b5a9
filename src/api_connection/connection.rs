use base64::{engine::general_purpose, Engine as _};
use dotenv::dotenv;
use reqwest::{Client, StatusCode};
use std::env;
use thiserror::Error;
use tracing::{debug, error};

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionPrompt, Content,
    ContentPart, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageUrl,
    InlineData, MessageContent, Part, Provider, GEMINI_BASE_URL,
    GEMINI_DEFAULT_MODEL, OPENROUTER_DEFAULT_MODEL, OPENROUTER_URL,
};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: StatusCode,
        error_body: String,
    },
    #[error("API response contained no content")]
    EmptyResponse,
}

impl Provider {
    pub fn openrouter(api_key_env_var_name: &str, model: Option<String>) -> Self {
        Self::OpenRouter {
            api_key: api_key_env_var_name.to_string(),
            model: model.unwrap_or_else(|| OPENROUTER_DEFAULT_MODEL.to_string()),
        }
    }

    pub fn gemini(api_key_env_var_name: &str, model: Option<String>) -> Self {
        Self::Gemini {
            api_key: api_key_env_var_name.to_string(),
            model: model.unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string()),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenRouter { model, .. } | Provider::Gemini { model, .. } => model,
        }
    }

    /// Sends one prompt and returns the text of the first answer.
    pub async fn complete(
        &self,
        client: &Client,
        prompt: &CompletionPrompt,
    ) -> Result<String, ApiConnectionError> {
        match self {
            Provider::OpenRouter { api_key, model } => {
                let key = read_api_key(api_key)?;
                let request = chat_completion_request(model, prompt);
                call_chat_completion(client, &key, &request).await
            }
            Provider::Gemini { api_key, model } => {
                let key = read_api_key(api_key)?;
                let request = generate_content_request(prompt);
                call_generate_content(client, &key, model, &request).await
            }
        }
    }
}

fn read_api_key(api_key_env_var_name: &str) -> Result<String, ApiConnectionError> {
    dotenv().ok();
    env::var(api_key_env_var_name)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ApiConnectionError::MissingApiKey(api_key_env_var_name.to_string()))
}

fn chat_completion_request(model: &str, prompt: &CompletionPrompt) -> ChatCompletionRequest {
    let content = match &prompt.image {
        None => MessageContent::Text(prompt.text.clone()),
        Some(image) => MessageContent::Parts(vec![
            ContentPart::Text {
                text: prompt.text.clone(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!(
                        "data:{};base64,{}",
                        image.mime_type,
                        general_purpose::STANDARD.encode(&image.data)
                    ),
                },
            },
        ]),
    };

    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content,
        }],
        temperature: Some(0.7),
        max_tokens: Some(4096),
    }
}

fn generate_content_request(prompt: &CompletionPrompt) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: prompt.text.clone(),
    }];
    if let Some(image) = &prompt.image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: general_purpose::STANDARD.encode(&image.data),
            },
        });
    }

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: prompt.json_output.then(|| GenerationConfig {
            response_mime_type: "application/json".to_string(),
        }),
    }
}

async fn call_chat_completion(
    client: &Client,
    api_key: &str,
    request: &ChatCompletionRequest,
) -> Result<String, ApiConnectionError> {
    let site_url = env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Culinary AI".to_string());

    debug!("POST {} (model {})", OPENROUTER_URL, request.model);
    let response = client
        .post(OPENROUTER_URL)
        .bearer_auth(api_key)
        .header("HTTP-Referer", site_url)
        .header("X-Title", app_name)
        .json(request)
        .send()
        .await?;

    let response = ensure_success(response).await?;
    let chat_response = response.json::<ChatCompletionResponse>().await?;

    let choice = chat_response
        .choices
        .into_iter()
        .next()
        .ok_or(ApiConnectionError::EmptyResponse)?;
    debug!(
        "Completion {} from {} finished: {}",
        chat_response.id,
        chat_response.model,
        choice.finish_reason.as_deref().unwrap_or("unknown")
    );
    choice.message.content.ok_or(ApiConnectionError::EmptyResponse)
}

async fn call_generate_content(
    client: &Client,
    api_key: &str,
    model: &str,
    request: &GenerateContentRequest,
) -> Result<String, ApiConnectionError> {
    let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, model);

    debug!("POST {}", url);
    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .json(request)
        .send()
        .await?;

    let response = ensure_success(response).await?;
    let gemini_response = response.json::<GenerateContentResponse>().await?;

    gemini_response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(ApiConnectionError::EmptyResponse)
}

async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiConnectionError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    error!("LLM API error: {} - {}", status, error_body);
    Err(ApiConnectionError::ApiError { status, error_body })
}
