//! Provider selection and fallback.

use crate::config::{Credentials, PollPolicy};
use crate::error::{ImageGenError, ProviderFailure, Result};
use crate::image::provider::ImageProvider;
use crate::image::providers::{GeminiProvider, OpenAiImageProvider, ReplicateProvider};
use crate::image::registry::ProviderRegistry;
use crate::image::types::{GenerationOptions, GenerationRequest, GenerationResult, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for [`Generator`].
#[derive(Default)]
pub struct GeneratorBuilder {
    credentials: Option<Credentials>,
    poll: Option<PollPolicy>,
    base_urls: HashMap<ProviderKind, String>,
    adapters: HashMap<ProviderKind, Arc<dyn ImageProvider>>,
}

impl GeneratorBuilder {
    /// Creates a new builder. Credentials default to the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses these credentials instead of reading the environment.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Polling policy for asynchronous providers. Defaults to the environment.
    pub fn poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = Some(poll);
        self
    }

    /// Overrides the API origin of one built-in provider.
    pub fn base_url(mut self, kind: ProviderKind, url: impl Into<String>) -> Self {
        self.base_urls.insert(kind, url.into());
        self
    }

    /// Replaces the built-in adapter for `provider.kind()`.
    ///
    /// The provider is only used while its kind has a credential.
    pub fn provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.adapters.insert(provider.kind(), provider);
        self
    }

    /// Builds adapters for every usable provider.
    pub fn build(mut self) -> Result<Generator> {
        let credentials = self.credentials.take().unwrap_or_else(Credentials::from_env);
        let registry = ProviderRegistry::new(credentials);
        let poll = self.poll.unwrap_or_else(PollPolicy::from_env);

        let mut adapters: HashMap<ProviderKind, Arc<dyn ImageProvider>> = HashMap::new();
        for kind in registry.usable_providers() {
            let adapter = match self.adapters.remove(&kind) {
                Some(adapter) => adapter,
                None => self.build_adapter(&registry, kind, poll)?,
            };
            adapters.insert(kind, adapter);
        }

        Ok(Generator { registry, adapters })
    }

    fn build_adapter(
        &self,
        registry: &ProviderRegistry,
        kind: ProviderKind,
        poll: PollPolicy,
    ) -> Result<Arc<dyn ImageProvider>> {
        let credential = registry.credential_for(kind)?;
        let base_url = self.base_urls.get(&kind);

        let adapter: Arc<dyn ImageProvider> = match kind {
            ProviderKind::OpenAI => {
                let mut builder = OpenAiImageProvider::builder().credential(credential);
                if let Some(url) = base_url {
                    builder = builder.base_url(url);
                }
                Arc::new(builder.build()?)
            }
            ProviderKind::Gemini => {
                let mut builder = GeminiProvider::builder().credential(credential);
                if let Some(url) = base_url {
                    builder = builder.base_url(url);
                }
                Arc::new(builder.build()?)
            }
            ProviderKind::Replicate => {
                let mut builder = ReplicateProvider::builder()
                    .credential(credential)
                    .poll_policy(poll);
                if let Some(url) = base_url {
                    builder = builder.base_url(url);
                }
                Arc::new(builder.build()?)
            }
        };
        Ok(adapter)
    }
}

/// Generates images with the best available provider, falling back to the
/// others when it fails.
///
/// Attempts are sequential. A provider is never tried twice for one call, so
/// a call makes at most one attempt per usable provider.
pub struct Generator {
    registry: ProviderRegistry,
    adapters: HashMap<ProviderKind, Arc<dyn ImageProvider>>,
}

impl Generator {
    /// Creates a new `GeneratorBuilder`.
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    /// Builds a generator from environment credentials and polling settings.
    pub fn from_env() -> Result<Self> {
        GeneratorBuilder::new().build()
    }

    /// The registry this generator dispatches through.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Generates an image for `prompt`.
    pub async fn generate(
        &self,
        prompt: impl Into<String>,
        options: GenerationOptions,
    ) -> Result<GenerationResult> {
        let request = GenerationRequest::from_options(prompt, &options);
        self.generate_request(&request, options.provider).await
    }

    /// Generates an image for a prebuilt request, optionally forcing the first
    /// provider tried.
    pub async fn generate_request(
        &self,
        request: &GenerationRequest,
        provider: Option<ProviderKind>,
    ) -> Result<GenerationResult> {
        request.validate()?;

        let usable = self.registry.usable_providers();
        if usable.is_empty() {
            return Err(ImageGenError::NoProviderConfigured);
        }

        let mut current = match provider {
            Some(kind) => kind,
            None => self.registry.default_provider()?,
        };
        let mut failures: Vec<ProviderFailure> = Vec::new();

        loop {
            match self.attempt(current, request).await {
                Ok(result) => {
                    if !failures.is_empty() {
                        tracing::info!(provider = %result.provider, failed = failures.len(), "generated image after fallback");
                    }
                    return Ok(result);
                }
                Err(error) => {
                    tracing::warn!(provider = %current, error = %error, "image generation failed, trying fallback");
                    failures.push(ProviderFailure {
                        provider: current,
                        error,
                    });
                }
            }

            let next = usable
                .iter()
                .copied()
                .find(|kind| failures.iter().all(|failure| failure.provider != *kind));

            match next {
                Some(kind) => current = kind,
                None => return Err(ImageGenError::AllProvidersFailed { attempts: failures }),
            }
        }
    }

    async fn attempt(
        &self,
        kind: ProviderKind,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let Some(adapter) = self.adapters.get(&kind) else {
            let cause = match self.registry.credential_for(kind) {
                Err(missing) => missing,
                Ok(_) => ImageGenError::UnexpectedResponse("no adapter registered".into()),
            };
            return Err(cause.for_provider(kind));
        };

        tracing::debug!(provider = %kind, "dispatching image generation");
        adapter
            .generate(request)
            .await
            .map_err(|e| e.for_provider(kind))
    }
}
