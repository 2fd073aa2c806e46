//! Error types for image generation.

use crate::image::ProviderKind;
use std::time::Duration;

/// Errors that can occur during image generation.
#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    /// No provider has a credential configured.
    #[error("no image generation provider configured, set one of OPENAI_API_KEY, GEMINI_API_KEY or REPLICATE_API_TOKEN")]
    NoProviderConfigured,

    /// A credential was requested for a provider that is not usable.
    #[error("no credential configured for provider {0}")]
    MissingCredential(ProviderKind),

    /// A single provider's attempt failed. The orchestrator falls back on this.
    #[error("{provider} failed: {source}")]
    ProviderGeneration {
        /// Provider that failed.
        provider: ProviderKind,
        /// Underlying cause.
        #[source]
        source: Box<ImageGenError>,
    },

    /// Every usable provider was tried and failed.
    #[error("all image generation providers failed ({})", describe_failures(.attempts))]
    AllProvidersFailed {
        /// One entry per attempt, in the order they were made.
        attempts: Vec<ProviderFailure>,
    },

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered with a payload we could not use.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The provider reported that the generation job failed.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// Polling exceeded the configured timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Polling exceeded the configured number of status checks.
    #[error("job still running after {0} status checks")]
    PollLimitExceeded(u32),

    /// I/O error (e.g., saving a downloaded image).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageGenError {
    /// Wraps this error as a failure of `provider`, unless it already is one.
    pub fn for_provider(self, provider: ProviderKind) -> Self {
        match self {
            Self::ProviderGeneration { .. } => self,
            other => Self::ProviderGeneration {
                provider,
                source: Box::new(other),
            },
        }
    }

    /// Returns true if the orchestrator should try another provider.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, Self::ProviderGeneration { .. })
    }

    /// Returns the provider a failure is attributed to, if any.
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            Self::ProviderGeneration { provider, .. } => Some(*provider),
            Self::MissingCredential(provider) => Some(*provider),
            _ => None,
        }
    }
}

/// A single failed attempt recorded during fallback.
#[derive(Debug)]
pub struct ProviderFailure {
    /// Provider that was attempted.
    pub provider: ProviderKind,
    /// Why it failed.
    pub error: ImageGenError,
}

fn describe_failures(attempts: &[ProviderFailure]) -> String {
    attempts
        .iter()
        .map(|failure| match &failure.error {
            ImageGenError::ProviderGeneration { source, .. } => {
                format!("{}: {}", failure.provider, source)
            }
            other => format!("{}: {}", failure.provider, other),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for image generation operations.
pub type Result<T> = std::result::Result<T, ImageGenError>;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Trims a provider error body to something safe to log and display.
///
/// Long bodies are truncated and anything that looks like an API key is masked.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            let trimmed = word.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_');
            if looks_like_secret(trimmed) {
                word.replace(trimmed, "[REDACTED]")
            } else {
                word.to_string()
            }
        })
        .collect();
    let joined = redacted.join(" ");

    if joined.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut: String = joined.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{cut}...")
    } else {
        joined
    }
}

fn looks_like_secret(word: &str) -> bool {
    const PREFIXES: [&str; 3] = ["sk-", "r8_", "AIza"];
    PREFIXES
        .iter()
        .any(|prefix| word.starts_with(prefix) && word.len() > prefix.len() + 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_provider_wraps_once() {
        let err = ImageGenError::GenerationFailed("boom".into())
            .for_provider(ProviderKind::Replicate)
            .for_provider(ProviderKind::OpenAI);

        assert_eq!(err.provider(), Some(ProviderKind::Replicate));
        assert!(err.is_fallback_eligible());
        assert_eq!(err.to_string(), "replicate failed: generation failed: boom");
    }

    #[test]
    fn test_terminal_errors_are_not_fallback_eligible() {
        assert!(!ImageGenError::NoProviderConfigured.is_fallback_eligible());
        assert!(!ImageGenError::AllProvidersFailed { attempts: vec![] }.is_fallback_eligible());
        assert!(!ImageGenError::InvalidRequest("empty".into()).is_fallback_eligible());
    }

    #[test]
    fn test_all_providers_failed_display() {
        let err = ImageGenError::AllProvidersFailed {
            attempts: vec![
                ProviderFailure {
                    provider: ProviderKind::OpenAI,
                    error: ImageGenError::Api {
                        status: 500,
                        message: "down".into(),
                    }
                    .for_provider(ProviderKind::OpenAI),
                },
                ProviderFailure {
                    provider: ProviderKind::Gemini,
                    error: ImageGenError::Timeout(Duration::from_secs(3)),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "all image generation providers failed (openai: API error: 500 - down; gemini: operation timed out after 3s)"
        );
    }

    #[test]
    fn test_sanitize_redacts_keys() {
        let msg = sanitize_error_message("Incorrect API key provided: sk-abcdefghijklmnop.");
        assert!(!msg.contains("abcdefghijklmnop"));
        assert!(msg.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(2_000);
        let msg = sanitize_error_message(&body);
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().count(), MAX_ERROR_MESSAGE_LEN + 3);
    }
}
