// Completion provider abstraction
//
// The conversation core talks to the remote model through this trait so the
// transport can be swapped (or faked in tests) without touching session logic.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{ProviderConfig, ProviderKind};
use crate::conversation::Transcript;
use crate::errors::RemoteError;

pub mod gemini;
pub mod retry;

pub use gemini::GeminiProvider;
pub use retry::{with_retry, RetryPolicy};

/// One outgoing completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub transcript: Transcript,

    /// Upper bound on reply length in output tokens
    pub max_output_tokens: u32,
}

impl CompletionRequest {
    pub fn new(transcript: Transcript, max_output_tokens: u32) -> Self {
        Self {
            transcript,
            max_output_tokens,
        }
    }
}

/// Trait for remote text-completion services
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Submit the transcript and return the reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteError>;

    /// Provider name (e.g., "gemini")
    fn name(&self) -> &str;

    /// Model the provider sends requests to
    fn model(&self) -> &str;
}

/// Build the provider described by `config`
pub fn create_provider(config: &ProviderConfig) -> anyhow::Result<Arc<dyn CompletionProvider>> {
    match config.kind {
        ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::from_config(config)?)),
    }
}
