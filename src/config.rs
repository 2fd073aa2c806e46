//! Credentials and polling configuration.

use crate::image::ProviderKind;
use std::time::Duration;

/// Secret API key or token for one provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret. Returns `None` for blank values.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// Returns the secret for use in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// Credentials for every provider, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    openai: Option<Credential>,
    gemini: Option<Credential>,
    replicate: Option<Credential>,
}

impl Credentials {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads each provider's environment variable. Unset or blank variables
    /// leave that provider unconfigured.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds credentials from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut credentials = Self::new();
        for kind in ProviderKind::ALL {
            if let Some(credential) = lookup(kind.env_var()).and_then(Credential::new) {
                credentials.set(kind, credential);
            }
        }
        credentials
    }

    /// Sets the credential for `kind`. Blank secrets are ignored.
    pub fn with(mut self, kind: ProviderKind, secret: impl Into<String>) -> Self {
        if let Some(credential) = Credential::new(secret) {
            self.set(kind, credential);
        }
        self
    }

    /// Returns the credential for `kind`, if any.
    pub fn get(&self, kind: ProviderKind) -> Option<&Credential> {
        self.slot(kind).as_ref()
    }

    fn set(&mut self, kind: ProviderKind, credential: Credential) {
        *self.slot_mut(kind) = Some(credential);
    }

    fn slot(&self, kind: ProviderKind) -> &Option<Credential> {
        match kind {
            ProviderKind::OpenAI => &self.openai,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Replicate => &self.replicate,
        }
    }

    fn slot_mut(&mut self, kind: ProviderKind) -> &mut Option<Credential> {
        match kind {
            ProviderKind::OpenAI => &mut self.openai,
            ProviderKind::Gemini => &mut self.gemini,
            ProviderKind::Replicate => &mut self.replicate,
        }
    }
}

/// How long an asynchronous provider keeps polling a job.
///
/// The default polls every second with no bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between status checks.
    pub interval: Duration,
    /// Give up once this much time has elapsed.
    pub timeout: Option<Duration>,
    /// Give up after this many status checks.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: None,
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    /// Environment variable overriding the poll interval, in milliseconds.
    pub const INTERVAL_ENV: &'static str = "IMAGEGEN_POLL_INTERVAL_MS";
    /// Environment variable bounding total poll time, in seconds.
    pub const TIMEOUT_ENV: &'static str = "IMAGEGEN_POLL_TIMEOUT_SECS";
    /// Environment variable bounding the number of status checks.
    pub const MAX_ATTEMPTS_ENV: &'static str = "IMAGEGEN_POLL_MAX_ATTEMPTS";
    /// Shortest interval accepted from the environment.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

    /// Reads overrides from the environment on top of the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads overrides from an arbitrary variable lookup. Values that do not
    /// parse are ignored; intervals below [`Self::MIN_INTERVAL`] are raised to it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| -> Option<u64> {
            let raw = lookup(name)?;
            match raw.trim().parse::<u64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(variable = name, value = %raw, "ignoring unparsable polling setting");
                    None
                }
            }
        };

        let mut policy = Self::default();
        if let Some(ms) = read(Self::INTERVAL_ENV) {
            let interval = Duration::from_millis(ms);
            if interval < Self::MIN_INTERVAL {
                tracing::warn!(
                    variable = Self::INTERVAL_ENV,
                    value = ms,
                    min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                    "polling interval too short, using the minimum"
                );
            }
            policy.interval = interval.max(Self::MIN_INTERVAL);
        }
        if let Some(secs) = read(Self::TIMEOUT_ENV) {
            policy.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(attempts) = read(Self::MAX_ATTEMPTS_ENV) {
            policy.max_attempts = Some(u32::try_from(attempts).unwrap_or(u32::MAX));
        }
        policy
    }

    /// Sets the delay between status checks.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the total time spent polling.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bounds the number of status checks.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("GEMINI_API_KEY", "   "),
            ("REPLICATE_API_TOKEN", "r8-test"),
        ]));

        assert_eq!(creds.get(ProviderKind::OpenAI).unwrap().expose(), "sk-test");
        assert!(creds.get(ProviderKind::Gemini).is_none());
        assert_eq!(creds.get(ProviderKind::Replicate).unwrap().expose(), "r8-test");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::new("sk-very-secret").unwrap();
        assert!(!format!("{cred:?}").contains("secret"));
    }

    #[test]
    fn test_poll_policy_defaults_are_unbounded() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert!(policy.timeout.is_none());
        assert!(policy.max_attempts.is_none());
    }

    #[test]
    fn test_poll_policy_from_lookup() {
        let policy = PollPolicy::from_lookup(lookup(&[
            ("IMAGEGEN_POLL_INTERVAL_MS", "250"),
            ("IMAGEGEN_POLL_TIMEOUT_SECS", "90"),
            ("IMAGEGEN_POLL_MAX_ATTEMPTS", "not-a-number"),
        ]));

        assert_eq!(policy.interval, Duration::from_millis(250));
        assert_eq!(policy.timeout, Some(Duration::from_secs(90)));
        assert!(policy.max_attempts.is_none());
    }

    #[test]
    fn test_poll_interval_from_env_is_clamped() {
        let zero = PollPolicy::from_lookup(lookup(&[("IMAGEGEN_POLL_INTERVAL_MS", "0")]));
        assert_eq!(zero.interval, PollPolicy::MIN_INTERVAL);

        let short = PollPolicy::from_lookup(lookup(&[("IMAGEGEN_POLL_INTERVAL_MS", "5")]));
        assert_eq!(short.interval, PollPolicy::MIN_INTERVAL);

        let exact = PollPolicy::from_lookup(lookup(&[("IMAGEGEN_POLL_INTERVAL_MS", "100")]));
        assert_eq!(exact.interval, Duration::from_millis(100));
    }
}
