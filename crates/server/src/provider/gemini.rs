//! Google Gemini image generation over the REST `generateContent` endpoint.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::GeminiConfig;

use super::error::ProviderError;
use super::media::InlineImage;
use super::svg;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_OUTPUT_TOKENS: u32 = 2048;
const TEMPERATURE: f32 = 0.9;
const POWERED_BY: &str = "Google Gemini AI";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    model: String,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    status: Option<String>,
    message: String,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(image: InlineImage) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                mime_type: Some(image.mime_type),
                data: image.data,
            }),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &GeminiConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(GeminiClientInner {
                client,
                model: config.model.clone(),
            }),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Render the client with the described hairstyle.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the answer holds neither an
    /// image nor text.
    #[instrument(skip(self, photo), fields(model = %self.inner.model))]
    pub async fn generate_from_prompt(
        &self,
        photo: InlineImage,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let parts = vec![Part::text(prompt_instructions(prompt)), Part::image(photo)];
        self.generate(parts).await
    }

    /// Render the client with the hairstyle shown in `style`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the answer holds neither an
    /// image nor text.
    #[instrument(skip(self, photo, style), fields(model = %self.inner.model))]
    pub async fn generate_from_reference(
        &self,
        photo: InlineImage,
        style: InlineImage,
    ) -> Result<String, ProviderError> {
        let parts = vec![
            Part::text(STYLE_TRANSFER_INSTRUCTIONS),
            Part::image(photo),
            Part::text("Reference hairstyle to apply:"),
            Part::image(style),
        ];
        self.generate(parts).await
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature: TEMPERATURE,
            },
        };

        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.inner.model);
        let response = self.inner.client.post(url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Parse(format!("Failed to parse response: {e}")))?;

        extract_output(parsed)
    }
}

/// Turn a response into an output reference.
///
/// The first inline image wins; a text-only answer becomes a result card.
fn extract_output(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    let mut text = String::new();
    for part in parts {
        if let Some(blob) = part.inline_data
            && !blob.data.is_empty()
        {
            let mime_type = blob.mime_type.as_deref().unwrap_or("image/jpeg");
            debug!(chars = blob.data.len(), mime_type, "Extracted generated image");
            return Ok(format!("data:{mime_type};base64,{}", blob.data));
        }
        if let Some(t) = part.text {
            text.push_str(&t);
        }
    }

    if text.trim().is_empty() {
        return Err(ProviderError::Unavailable);
    }

    debug!("No image in response, rendering text answer");
    Ok(svg::result_card(&text, "AI Generated Result", POWERED_BY))
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

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return ProviderError::Unauthorized("Invalid Gemini API key".to_string());
    }

    match response.text().await {
        Ok(body) => serde_json::from_str::<ApiErrorResponse>(&body).map_or_else(
            |_| ProviderError::Api {
                error_type: status.as_u16().to_string(),
                message: body.clone(),
            },
            |api_error| ProviderError::Api {
                error_type: api_error
                    .error
                    .status
                    .unwrap_or_else(|| status.as_u16().to_string()),
                message: api_error.error.message,
            },
        ),
        Err(e) => ProviderError::Http(e),
    }
}

fn prompt_instructions(prompt: &str) -> String {
    format!(
        "Generate a high-quality, photorealistic image of the person in the attached photo \
         wearing this hairstyle: \"{prompt}\".\n\n\
         Requirements:\n\
         - Keep the client's facial features, skin tone and face shape from the input photo\n\
         - Apply the \"{prompt}\" hairstyle accurately\n\
         - Professional salon quality, natural and realistic\n\
         - Keep the lighting and photo quality of the input\n\n\
         Return only the image, no text description."
    )
}

const STYLE_TRANSFER_INSTRUCTIONS: &str = "Generate a photorealistic image of the client in the first photo \
     wearing the hairstyle shown in the reference photo.\n\n\
     - Keep the client's face and features exactly as they appear\n\
     - Apply the reference hairstyle to the client\n\
     - Professional salon quality with natural lighting and proportions\n\n\
     Return only the transformed image, no text.";
