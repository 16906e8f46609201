//! `OpenAI` chat completions with image inputs.
//!
//! The model describes the transformation in text; the description is laid
//! out on a result card.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::OpenAiConfig;

use super::error::ProviderError;
use super::svg;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 2048;
const POWERED_BY: &str = "OpenAI GPT-4 Vision";
const EMPTY_ANSWER: &str = "No response generated";

/// `OpenAI` API client.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<OpenAiClientInner>,
}

struct OpenAiClientInner {
    client: reqwest::Client,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    message: String,
}

impl ContentPart {
    fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    fn image(url: String) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url },
        }
    }
}

impl OpenAiClient {
    /// Create a new `OpenAI` client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &OpenAiConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
                .expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(OpenAiClientInner {
                client,
                model: config.model.clone(),
            }),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Describe the client with the requested hairstyle.
    ///
    /// `photo_url` must be a `data:` URL or a URL the API can fetch.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, photo_url), fields(model = %self.inner.model))]
    pub async fn generate_from_prompt(
        &self,
        photo_url: String,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let content = vec![
            ContentPart::text(prompt_instructions(prompt)),
            ContentPart::image(photo_url),
        ];
        let answer = self.complete(content).await?;
        Ok(svg::result_card(&answer, prompt, POWERED_BY))
    }

    /// Describe how to reach the hairstyle shown in the reference photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, photo_url, style_url), fields(model = %self.inner.model))]
    pub async fn generate_from_reference(
        &self,
        photo_url: String,
        style_url: String,
    ) -> Result<String, ProviderError> {
        let content = vec![
            ContentPart::text(STYLE_TRANSFER_INSTRUCTIONS),
            ContentPart::image(photo_url),
            ContentPart::text("Reference hairstyle to achieve:"),
            ContentPart::image(style_url),
        ];
        let answer = self.complete(content).await?;
        Ok(svg::result_card(&answer, "Style Transfer", POWERED_BY))
    }

    async fn complete(&self, content: Vec<ContentPart>) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .inner
            .client
            .post(OPENAI_API_URL)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Parse(format!("Failed to parse response: {e}")))?;

        Ok(answer_text(parsed))
    }
}

fn answer_text(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| EMPTY_ANSWER.to_string())
}

async fn handle_error_status(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> ProviderError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return ProviderError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return ProviderError::Unauthorized("Invalid OpenAI API key".to_string());
    }

    match response.text().await {
        Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_error) => ProviderError::Api {
                error_type: api_error
                    .error
                    .error_type
                    .unwrap_or_else(|| "unknown".to_string()),
                message: api_error.error.message,
            },
            Err(_) => ProviderError::Api {
                error_type: "unknown".to_string(),
                message: body,
            },
        },
        Err(e) => ProviderError::Http(e),
    }
}

fn prompt_instructions(prompt: &str) -> String {
    format!(
        "You are a professional hairstylist. Look at the client in the attached photo and \
         describe in detail how they would look with this hairstyle: \"{prompt}\".\n\n\
         Cover their current hair, the proposed cut, how it suits their face shape, \
         the cutting and styling technique, colour and finish, and daily maintenance. \
         Be specific and vivid so the client can picture the result."
    )
}

const STYLE_TRANSFER_INSTRUCTIONS: &str = "You are a professional hairstylist. The client in the first \
     photo wants the hairstyle shown in the reference photo from the salon's library.\n\n\
     Describe the reference style, how to adapt it to the client's face shape and hair type, \
     the cutting and styling steps, colour and texture considerations, and how to maintain it.";
