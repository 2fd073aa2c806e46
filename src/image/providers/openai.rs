//! OpenAI image generation provider (dall-e-3).

use crate::config::Credential;
use crate::error::{sanitize_error_message, ImageGenError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{GenerationRequest, GenerationResult, ProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenAiImageModel {
    /// DALL-E 3 - supports style and hd quality.
    #[default]
    DallE3,
}

impl OpenAiImageModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DallE3 => "dall-e-3",
        }
    }
}

/// Builder for OpenAiImageProvider.
#[derive(Debug, Clone, Default)]
pub struct OpenAiImageProviderBuilder {
    api_key: Option<String>,
    model: OpenAiImageModel,
    base_url: Option<String>,
}

impl OpenAiImageProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `OPENAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Uses a registry credential as the API key.
    pub fn credential(self, credential: &Credential) -> Self {
        self.api_key(credential.expose())
    }

    /// Sets the OpenAI image model variant.
    pub fn model(mut self, model: OpenAiImageModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API origin (e.g., for a proxy).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<OpenAiImageProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(ProviderKind::OpenAI.env_var()).ok())
            .and_then(Credential::new)
            .ok_or(ImageGenError::MissingCredential(ProviderKind::OpenAI))?;

        Ok(OpenAiImageProvider {
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

/// OpenAI image generation provider.
///
/// Synchronous: the generations endpoint answers with a hosted image URL.
pub struct OpenAiImageProvider {
    client: reqwest::Client,
    api_key: Credential,
    model: OpenAiImageModel,
    base_url: String,
}

impl OpenAiImageProvider {
    /// Creates a new `OpenAiImageProviderBuilder`.
    pub fn builder() -> OpenAiImageProviderBuilder {
        OpenAiImageProviderBuilder::new()
    }

    /// Pixel size sent to the API. Malformed sizes fall back to 1024x1024.
    fn resolve_size(request: &GenerationRequest) -> String {
        request.dimensions().unwrap_or_default().to_string()
    }

    fn parse_error(&self, status: u16, text: &str) -> ImageGenError {
        let message = serde_json::from_str::<OpenAiErrorResponse>(text)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| text.to_string());

        ImageGenError::Api {
            status,
            message: sanitize_error_message(&message),
        }
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let url = format!("{}/v1/images/generations", self.base_url);
        let body = OpenAiImageRequest::from_generation_request(request, &self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        let openai_response: OpenAiImageResponse = response.json().await?;

        let image = openai_response.data.into_iter().next().ok_or_else(|| {
            ImageGenError::UnexpectedResponse("No images in OpenAI response".into())
        })?;

        let url = image.url.ok_or_else(|| {
            ImageGenError::UnexpectedResponse("OpenAI response contained no image URL".into())
        })?;

        Ok(GenerationResult::new(url, ProviderKind::OpenAI).with_revised_prompt(image.revised_prompt))
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.generate_impl(request)
            .await
            .map_err(|e| e.for_provider(ProviderKind::OpenAI))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }
}

#[derive(Debug, Serialize)]
struct OpenAiImageRequest {
    model: &'static str,
    prompt: String,
    n: u32,
    size: String,
    style: &'static str,
    quality: &'static str,
}

impl OpenAiImageRequest {
    fn from_generation_request(req: &GenerationRequest, model: &OpenAiImageModel) -> Self {
        Self {
            model: model.as_str(),
            prompt: req.prompt.clone(),
            n: 1,
            size: OpenAiImageProvider::resolve_size(req),
            style: req.style.as_str(),
            quality: req.quality.as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}
