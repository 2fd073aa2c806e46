//! Replicate (Stable Diffusion) image generation provider.

use crate::config::{Credential, PollPolicy};
use crate::error::{sanitize_error_message, ImageGenError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{GenerationRequest, GenerationResult, ProviderKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

const DEFAULT_BASE_URL: &str = "https://api.replicate.com";
const DEFAULT_DIMENSION: u32 = 1024;

/// Replicate model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplicateModel {
    /// Stable Diffusion 3.5 Large.
    #[default]
    StableDiffusion35Large,
}

impl ReplicateModel {
    /// Returns the model version identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StableDiffusion35Large => "stability-ai/stable-diffusion-3.5-large",
        }
    }
}

/// Builder for ReplicateProvider.
#[derive(Debug, Clone, Default)]
pub struct ReplicateProviderBuilder {
    api_key: Option<String>,
    model: ReplicateModel,
    base_url: Option<String>,
    poll: PollPolicy,
}

impl ReplicateProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API token. Falls back to `REPLICATE_API_TOKEN` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Uses a registry credential as the API token.
    pub fn credential(self, credential: &Credential) -> Self {
        self.api_key(credential.expose())
    }

    /// Sets the model variant.
    pub fn model(mut self, model: ReplicateModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API origin.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replaces the whole polling policy.
    pub fn poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Sets the polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    /// Sets the maximum time to wait for a prediction.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.poll.timeout = Some(timeout);
        self
    }

    /// Sets the maximum number of status checks.
    pub fn max_poll_attempts(mut self, attempts: u32) -> Self {
        self.poll.max_attempts = Some(attempts);
        self
    }

    /// Builds the provider, resolving the API token.
    pub fn build(self) -> Result<ReplicateProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(ProviderKind::Replicate.env_var()).ok())
            .and_then(Credential::new)
            .ok_or(ImageGenError::MissingCredential(ProviderKind::Replicate))?;

        Ok(ReplicateProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            poll: self.poll,
        })
    }
}

/// Replicate image generation provider.
///
/// Asynchronous: a prediction is created and then polled until it reaches a
/// terminal status. Polling is unbounded unless the [`PollPolicy`] sets a
/// timeout or attempt limit. A timeout covers the whole call, including the
/// submit request and every status request.
pub struct ReplicateProvider {
    client: reqwest::Client,
    api_key: Credential,
    model: ReplicateModel,
    base_url: String,
    poll: PollPolicy,
}

impl ReplicateProvider {
    /// Creates a new `ReplicateProviderBuilder`.
    pub fn builder() -> ReplicateProviderBuilder {
        ReplicateProviderBuilder::new()
    }

    /// Width and height parsed independently, each defaulting to 1024.
    fn resolve_dimensions(request: &GenerationRequest) -> (u32, u32) {
        let mut parts = request.size.split(['x', 'X']);
        let mut next = || {
            parts
                .next()
                .and_then(|part| part.trim().parse::<u32>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(DEFAULT_DIMENSION)
        };
        let width = next();
        let height = next();
        (width, height)
    }

    fn parse_error(&self, status: u16, text: &str) -> ImageGenError {
        let message = serde_json::from_str::<ReplicateErrorResponse>(text)
            .map(|e| e.detail)
            .unwrap_or_else(|_| text.to_string());

        ImageGenError::Api {
            status,
            message: sanitize_error_message(&message),
        }
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<Prediction> {
        let url = format!("{}/v1/predictions", self.base_url);
        let body = ReplicateRequest::from_generation_request(request, &self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        Ok(response.json().await?)
    }

    async fn fetch(&self, id: &str) -> Result<Prediction> {
        let url = format!("{}/v1/predictions/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.api_key.expose()))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        Ok(response.json().await?)
    }

    /// Time left before `deadline`, or `Timeout` once it has passed.
    fn remaining(&self, deadline: Option<Instant>) -> Result<Option<Duration>> {
        let (Some(deadline), Some(timeout)) = (deadline, self.poll.timeout) else {
            return Ok(None);
        };
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(ImageGenError::Timeout(timeout));
        }
        Ok(Some(left))
    }

    /// Runs one API call, cut off at `deadline` so a stalled request cannot
    /// outlive the poll timeout.
    async fn bounded<T>(
        &self,
        deadline: Option<Instant>,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.remaining(deadline)? {
            Some(left) => tokio::time::timeout(left, call)
                .await
                .map_err(|_| ImageGenError::Timeout(self.poll.timeout.unwrap_or(left)))?,
            None => call.await,
        }
    }

    /// Polls until the prediction reaches a terminal status.
    async fn poll_until_done(
        &self,
        mut prediction: Prediction,
        deadline: Option<Instant>,
    ) -> Result<Prediction> {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        while !prediction.status.is_terminal() {
            let left = self.remaining(deadline)?;
            if let Some(max) = self.poll.max_attempts {
                if attempts >= max {
                    return Err(ImageGenError::PollLimitExceeded(max));
                }
            }

            let pause = left.map_or(self.poll.interval, |left| left.min(self.poll.interval));
            tokio::time::sleep(pause).await;
            attempts += 1;

            prediction = self.bounded(deadline, self.fetch(&prediction.id)).await?;
            tracing::debug!(
                prediction_id = %prediction.id,
                status = ?prediction.status,
                attempt = attempts,
                elapsed_secs = start.elapsed().as_secs(),
                "polling Replicate prediction"
            );
        }

        Ok(prediction)
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let deadline = self.poll.timeout.map(|timeout| Instant::now() + timeout);

        let prediction = self.bounded(deadline, self.submit(request)).await?;
        tracing::debug!(prediction_id = %prediction.id, status = ?prediction.status, "submitted Replicate prediction");

        let prediction = self.poll_until_done(prediction, deadline).await?;

        match prediction.status {
            PredictionStatus::Succeeded => {
                let url = prediction.first_output().ok_or_else(|| {
                    ImageGenError::UnexpectedResponse("Replicate prediction has no output".into())
                })?;
                Ok(GenerationResult::new(url, ProviderKind::Replicate))
            }
            PredictionStatus::Canceled => Err(ImageGenError::GenerationFailed(
                "prediction was canceled".into(),
            )),
            _ => Err(ImageGenError::GenerationFailed(
                prediction
                    .error_message()
                    .unwrap_or_else(|| "Image generation failed".into()),
            )),
        }
    }
}

#[async_trait]
impl ImageProvider for ReplicateProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.generate_impl(request)
            .await
            .map_err(|e| e.for_provider(ProviderKind::Replicate))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Replicate
    }
}

#[derive(Debug, Serialize)]
struct ReplicateRequest {
    version: &'static str,
    input: ReplicateInput,
}

#[derive(Debug, Serialize)]
struct ReplicateInput {
    prompt: String,
    width: u32,
    height: u32,
    num_inference_steps: u32,
    guidance_scale: f32,
}

impl ReplicateRequest {
    fn from_generation_request(req: &GenerationRequest, model: &ReplicateModel) -> Self {
        let (width, height) = ReplicateProvider::resolve_dimensions(req);
        Self {
            version: model.as_str(),
            input: ReplicateInput {
                prompt: req.prompt.clone(),
                width,
                height,
                num_inference_steps: 50,
                guidance_scale: 7.5,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl Prediction {
    /// Models return either a list of URLs or a single URL.
    fn first_output(&self) -> Option<String> {
        match self.output.as_ref()? {
            serde_json::Value::String(url) => Some(url.clone()),
            serde_json::Value::Array(items) => items.first()?.as_str().map(str::to_string),
            _ => None,
        }
    }

    fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(message) => Some(sanitize_error_message(message)),
            other => Some(sanitize_error_message(&other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReplicateErrorResponse {
    detail: String,
}
