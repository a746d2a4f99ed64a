use std::time::Duration;

use forum_client::{AvatarSize, DEFAULT_TIMEOUT, ForumClientError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "XF_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing endpoint config")]
    MissingEndpoint,
    #[error("missing API key: set `api_key` or {}", API_KEY_ENV)]
    MissingApiKey,
    #[error("invalid provider config: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error(transparent)]
    Client(#[from] ForumClientError),
}

/// Provider configuration as handed over by the host.
#[derive(Debug, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    /// Which `avatar_urls` variant is mirrored into the host profile.
    #[serde(default)]
    pub avatar_size: AvatarSize,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|key| !key.trim().is_empty())
        .map(|key| SecretString::new(key.into())))
}

impl BridgeConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            avatar_size: AvatarSize::default(),
            request_timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_avatar_size(mut self, size: AvatarSize) -> Self {
        self.avatar_size = size;
        self
    }

    /// Parses the provider's config block and checks the endpoint is set.
    pub fn parse(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured key, falling back to [`API_KEY_ENV`].
    pub fn resolve_api_key(&self) -> Result<SecretString, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_api_key_with<F>(&self, lookup_env: F) -> Result<SecretString, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(key) = &self.api_key {
            return Ok(SecretString::new(key.expose_secret().into()));
        }

        lookup_env(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .map(|key| SecretString::new(key.into()))
            .ok_or(ConfigError::MissingApiKey)
    }
}
