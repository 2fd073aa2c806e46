//! Which providers are usable, in priority order.

use crate::config::{Credential, Credentials};
use crate::error::{ImageGenError, Result};
use crate::image::types::ProviderKind;

/// Read-only view of configured providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    credentials: Credentials,
}

impl ProviderRegistry {
    /// Creates a registry over the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Creates a registry from the process environment.
    pub fn from_env() -> Self {
        Self::new(Credentials::from_env())
    }

    /// Providers with a credential, in priority order.
    pub fn usable_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.is_usable(*kind))
            .collect()
    }

    /// Returns true if `kind` has a credential.
    pub fn is_usable(&self, kind: ProviderKind) -> bool {
        self.credentials.get(kind).is_some()
    }

    /// The highest-priority usable provider.
    pub fn default_provider(&self) -> Result<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| self.is_usable(*kind))
            .ok_or(ImageGenError::NoProviderConfigured)
    }

    /// The credential bound to `kind`.
    pub fn credential_for(&self, kind: ProviderKind) -> Result<&Credential> {
        self.credentials
            .get(kind)
            .ok_or(ImageGenError::MissingCredential(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_providers_follow_priority_order() {
        let registry = ProviderRegistry::new(
            Credentials::new()
                .with(ProviderKind::Replicate, "r8-key")
                .with(ProviderKind::OpenAI, "sk-key"),
        );

        assert_eq!(
            registry.usable_providers(),
            vec![ProviderKind::OpenAI, ProviderKind::Replicate]
        );
        assert_eq!(registry.default_provider().unwrap(), ProviderKind::OpenAI);
    }

    #[test]
    fn test_default_provider_skips_missing() {
        let registry =
            ProviderRegistry::new(Credentials::new().with(ProviderKind::Replicate, "r8-key"));
        assert_eq!(registry.default_provider().unwrap(), ProviderKind::Replicate);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::default();
        assert!(registry.usable_providers().is_empty());
        assert!(matches!(
            registry.default_provider(),
            Err(ImageGenError::NoProviderConfigured)
        ));
    }

    #[test]
    fn test_credential_for_unusable_provider() {
        let registry =
            ProviderRegistry::new(Credentials::new().with(ProviderKind::Gemini, "AIza-key"));

        assert_eq!(
            registry.credential_for(ProviderKind::Gemini).unwrap().expose(),
            "AIza-key"
        );
        assert!(matches!(
            registry.credential_for(ProviderKind::OpenAI),
            Err(ImageGenError::MissingCredential(ProviderKind::OpenAI))
        ));
    }
}
