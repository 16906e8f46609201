//! Image generation backends.
//!
//! [`Provider`] is chosen once at startup from the configured credentials
//! (Gemini, then `OpenAI`, then the offline stub) and handed to the
//! orchestrator. Every call runs under the configured timeout; nothing is
//! retried.

pub mod error;
pub mod gemini;
pub mod media;
pub mod openai;
pub mod stub;
pub mod svg;

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use style_preview_core::GenerationKind;

use crate::config::ProviderConfig;

pub use error::ProviderError;
pub use gemini::GeminiClient;
pub use media::InlineImage;
pub use openai::OpenAiClient;

/// What to generate.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Stored reference of the client photo.
    pub photo_ref: String,
    pub prompt: Option<String>,
    /// Stored reference of the style-library photo.
    pub style_ref: Option<String>,
    /// Advisory; backends produce one image.
    pub variations: u32,
    pub kind: GenerationKind,
}

/// A finished generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutput {
    pub output_ref: String,
    pub duration_ms: i64,
    pub kind: GenerationKind,
}

/// The closed set of backends.
#[derive(Clone)]
pub enum Backend {
    Stub,
    Gemini(GeminiClient),
    OpenAi(OpenAiClient),
}

/// A backend plus the timeout every call runs under.
#[derive(Clone)]
pub struct Provider {
    backend: Backend,
    /// Plain client for downloading hosted photos; carries no API keys.
    http: reqwest::Client,
    timeout: Duration,
}

impl Provider {
    #[must_use]
    pub fn new(backend: Backend, timeout: Duration) -> Self {
        Self {
            backend,
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// Pick the backend from configured credentials: Gemini, then `OpenAI`, then the stub.
    #[must_use]
    pub fn select(config: &ProviderConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let backend = if let Some(gemini) = &config.gemini {
            info!(model = %gemini.model, "Using Google Gemini image generation");
            Backend::Gemini(GeminiClient::new(gemini))
        } else if let Some(openai) = &config.openai {
            info!(model = %openai.model, "Using OpenAI image analysis");
            Backend::OpenAi(OpenAiClient::new(openai))
        } else {
            info!("No AI credentials configured, using stub provider");
            Backend::Stub
        };
        Self::new(backend, timeout)
    }

    /// The offline stub.
    #[must_use]
    pub fn stub() -> Self {
        Self::new(Backend::Stub, Duration::from_secs(120))
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self.backend {
            Backend::Stub => "stub",
            Backend::Gemini(_) => "gemini",
            Backend::OpenAi(_) => "openai",
        }
    }

    /// Generate a preview.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Timeout` if the backend does not finish in
    /// time, or the backend's own error.
    #[instrument(skip(self, request), fields(provider = self.name(), kind = %request.kind))]
    pub async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        let started = Instant::now();

        let output_ref = tokio::time::timeout(self.timeout, self.dispatch(request))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
        info!(duration_ms, "Generation finished");

        Ok(ProviderOutput {
            output_ref,
            duration_ms,
            kind: request.kind,
        })
    }

    async fn dispatch(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        let prompt = request.prompt.as_deref().unwrap_or_default();
        let style_ref = match request.kind {
            GenerationKind::StyleReference => request.style_ref.as_deref(),
            GenerationKind::Prompt => None,
        };

        match &self.backend {
            Backend::Stub => Ok(stub::render(request.kind, request.prompt.as_deref())),
            Backend::Gemini(client) => {
                let photo = InlineImage::load(&self.http, &request.photo_ref).await?;
                match style_ref {
                    Some(style_ref) => {
                        let style = InlineImage::load(&self.http, style_ref).await?;
                        client.generate_from_reference(photo, style).await
                    }
                    None => client.generate_from_prompt(photo, prompt).await,
                }
            }
            Backend::OpenAi(client) => {
                let photo_url = self.image_url(&request.photo_ref).await?;
                match style_ref {
                    Some(style_ref) => {
                        let style_url = self.image_url(style_ref).await?;
                        client.generate_from_reference(photo_url, style_url).await
                    }
                    None => client.generate_from_prompt(photo_url, prompt).await,
                }
            }
        }
    }

    /// `data:` URLs pass through; hosted images are inlined so the backend
    /// never has to reach the image host.
    async fn image_url(&self, reference: &str) -> Result<String, ProviderError> {
        if reference.starts_with("data:") {
            return Ok(reference.to_string());
        }
        Ok(InlineImage::load(&self.http, reference).await?.to_data_url())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{GeminiConfig, OpenAiConfig};

    fn request(kind: GenerationKind) -> ProviderRequest {
        ProviderRequest {
            photo_ref: "data:image/jpeg;base64,AAAA".to_string(),
            prompt: Some("bob cut".to_string()),
            style_ref: None,
            variations: 1,
            kind,
        }
    }

    fn gemini_config() -> GeminiConfig {
        GeminiConfig {
            api_key: SecretString::from("AIzaSyD-k3yF0rT3sts0nly-9xQ7"),
            model: "gemini-2.5-flash-image".to_string(),
        }
    }

    #[test]
    fn test_select_prefers_gemini() {
        let config = ProviderConfig {
            gemini: Some(gemini_config()),
            openai: Some(OpenAiConfig {
                api_key: SecretString::from("sk-t3stK3yF0rUn1tT3sts0nly"),
                model: "gpt-4-turbo".to_string(),
            }),
            timeout_secs: 5,
        };
        assert_eq!(Provider::select(&config).name(), "gemini");

        let config = ProviderConfig {
            gemini: None,
            ..config
        };
        assert_eq!(Provider::select(&config).name(), "openai");
    }

    #[test]
    fn test_select_falls_back_to_stub() {
        let config = ProviderConfig {
            gemini: None,
            openai: None,
            timeout_secs: 5,
        };
        assert_eq!(Provider::select(&config).name(), "stub");
    }

    #[tokio::test]
    async fn test_stub_generation() {
        let provider = Provider::stub();
        let output = provider
            .generate(&request(GenerationKind::Prompt))
            .await
            .unwrap();

        assert_eq!(output.kind, GenerationKind::Prompt);
        assert!(output.output_ref.starts_with("data:image/svg+xml;base64,"));
        assert!(output.duration_ms >= 0);

        let again = provider
            .generate(&request(GenerationKind::Prompt))
            .await
            .unwrap();
        assert_eq!(output.output_ref, again.output_ref);
    }

    #[tokio::test]
    async fn test_hung_backend_times_out() {
        // Accepts connections (via the backlog) but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let provider = Provider::new(
            Backend::Gemini(GeminiClient::new(&gemini_config())),
            Duration::from_millis(200),
        );
        let mut req = request(GenerationKind::Prompt);
        req.photo_ref = format!("http://{addr}/photo.jpg");

        let err = provider.generate(&req).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(d) if d == Duration::from_millis(200)));
        assert_eq!(err.to_string(), "generation timed out after 200ms");
        drop(listener);
    }
}
