// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::constants::*;
use super::persona::Persona;
use crate::conversation::HistoryLimits;
use crate::providers::RetryPolicy;

/// Which completion backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
}

/// Remote completion endpoint settings
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    /// API key; may be left empty in the file and supplied via GEMINI_API_KEY
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on reply length in output tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ProviderConfig {
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            max_output_tokens: default_max_output_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Keep the key out of debug logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// What `send_turn` does when a previous call is still outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Fail fast with `ConcurrentCallRejected`
    #[default]
    Reject,
    /// Wait for the outstanding call, then run in issue order
    Queue,
}

/// Session behaviour: concurrency policy, history bounds, retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub busy_policy: BusyPolicy,

    /// Maximum exchanges kept as context (0 = unlimited)
    #[serde(default = "default_max_exchanges")]
    pub max_exchanges: usize,

    /// Maximum characters of retained history (0 = unlimited)
    #[serde(default = "default_max_history_chars")]
    pub max_history_chars: usize,

    /// Attempts per message, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl SessionConfig {
    pub fn history_limits(&self) -> HistoryLimits {
        HistoryLimits {
            max_exchanges: self.max_exchanges,
            max_history_chars: self.max_history_chars,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            busy_policy: BusyPolicy::default(),
            max_exchanges: default_max_exchanges(),
            max_history_chars: default_max_history_chars(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// JSONL conversation log (disabled when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub persona: Persona,
}

impl Config {
    pub fn with_provider(provider: ProviderConfig) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Check values that would make every round trip fail
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.trim().is_empty() {
            bail!("API key is empty");
        }
        if self.provider.model.trim().is_empty() {
            bail!("Model name is empty");
        }
        if !(self.provider.base_url.starts_with("http://")
            || self.provider.base_url.starts_with("https://"))
        {
            bail!(
                "Base URL must start with http:// or https:// (got '{}')",
                self.provider.base_url
            );
        }
        if self.provider.max_output_tokens == 0 {
            bail!("max_output_tokens must be greater than 0");
        }
        if self.provider.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }
        if self.session.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        self.persona.validate()?;
        Ok(())
    }

    /// TOML rendering with the API key redacted, for `ramani config`
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.provider.api_key = redact(&self.provider.api_key);
        Ok(toml::to_string_pretty(&shown)?)
    }
}

fn redact(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        "***".to_string()
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_exchanges() -> usize {
    DEFAULT_MAX_EXCHANGES
}

fn default_max_history_chars() -> usize {
    DEFAULT_MAX_HISTORY_CHARS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}
