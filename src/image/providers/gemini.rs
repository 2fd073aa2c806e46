//! Imagen (Google) image generation provider, served through the Gemini API.

use crate::config::Credential;
use crate::error::{sanitize_error_message, ImageGenError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{AspectRatio, GenerationRequest, GenerationResult, ProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Imagen model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Imagen 3.
    #[default]
    Imagen3,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imagen3 => "imagen-3.0-generate-001",
        }
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GEMINI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Uses a registry credential as the API key.
    pub fn credential(self, credential: &Credential) -> Self {
        self.api_key(credential.expose())
    }

    /// Sets the model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API origin.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(ProviderKind::Gemini.env_var()).ok())
            .and_then(Credential::new)
            .ok_or(ImageGenError::MissingCredential(ProviderKind::Gemini))?;

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Imagen image generation provider.
///
/// Ratio-based: pixel sizes are bucketed into 1:1, 16:9 or 9:16. The result
/// is a Cloud Storage URI rather than an HTTP URL.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Credential,
    model: GeminiModel,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Malformed sizes, including ones with a single valid side such as
    /// `"1024x"`, are treated as square.
    fn resolve_aspect_ratio(request: &GenerationRequest) -> AspectRatio {
        request
            .dimensions()
            .map(AspectRatio::from_size)
            .unwrap_or(AspectRatio::Square)
    }

    fn parse_error(&self, status: u16, text: &str) -> ImageGenError {
        let message = serde_json::from_str::<GeminiErrorResponse>(text)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| text.to_string());

        ImageGenError::Api {
            status,
            message: sanitize_error_message(&message),
        }
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let url = format!(
            "{}/v1beta/models/{}:generateImages",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::from_generation_request(request);
        tracing::debug!(aspect_ratio = %body.aspect_ratio, "submitting Imagen request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        let uri = gemini_response
            .generated_images
            .into_iter()
            .next()
            .and_then(|image| image.gcs_uri)
            .ok_or_else(|| {
                ImageGenError::UnexpectedResponse("No generated images in Imagen response".into())
            })?;

        Ok(GenerationResult::new(uri, ProviderKind::Gemini))
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.generate_impl(request)
            .await
            .map_err(|e| e.for_provider(ProviderKind::Gemini))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    prompt: String,
    number_of_images: u32,
    aspect_ratio: AspectRatio,
    safety_filter_level: &'static str,
    person_generation: &'static str,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            prompt: req.prompt.clone(),
            number_of_images: 1,
            aspect_ratio: GeminiProvider::resolve_aspect_ratio(req),
            safety_filter_level: "block_some",
            person_generation: "allow_adult",
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    generated_images: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    gcs_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}
