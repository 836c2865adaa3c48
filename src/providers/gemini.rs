// Google Gemini generateContent provider
//
// Gemini has no system role in `contents` and calls the assistant "model", so
// transcripts are converted on the way out. Preamble turns go out as user-role
// content ahead of the conversation.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, CompletionRequest};
use crate::config::ProviderConfig;
use crate::conversation::{Role, Transcript};
use crate::errors::RemoteError;

/// Longest error body excerpt carried into a RemoteError message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Google Gemini API provider
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Create a provider from endpoint settings
    pub fn from_config(config: &ProviderConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Convert a transcript into Gemini's request body
    fn to_gemini_request(transcript: &Transcript, max_output_tokens: u32) -> GeminiRequest {
        let contents = transcript
            .turns()
            .iter()
            .map(|turn| {
                // Gemini uses "model" instead of "assistant"
                let role = match turn.role {
                    Role::System | Role::User => "user",
                    Role::Assistant => "model",
                };
                GeminiContent {
                    role: role.to_string(),
                    parts: vec![GeminiPart {
                        text: Some(turn.text.clone()),
                    }],
                }
            })
            .collect();

        GeminiRequest {
            contents,
            generation_config: GeminiGenerationConfig {
                max_output_tokens,
            },
        }
    }

    /// Pull the reply text out of a decoded response
    fn reply_text(response: GeminiResponse) -> Result<String, RemoteError> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!(" (blocked: {})", r))
                .unwrap_or_default();
            return Err(RemoteError::malformed(format!(
                "Gemini returned no candidates in response{}",
                reason
            )));
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();

        if texts.is_empty() {
            let reason = candidate
                .finish_reason
                .map(|r| format!(" (finish reason: {})", r))
                .unwrap_or_default();
            return Err(RemoteError::malformed(format!(
                "Gemini response has no reply text{}",
                reason
            )));
        }

        Ok(texts.concat())
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RemoteError> {
        let body = Self::to_gemini_request(&request.transcript, request.max_output_tokens);

        tracing::debug!(
            model = %self.model,
            turns = body.contents.len(),
            max_output_tokens = request.max_output_tokens,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let excerpt: String = error_body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(RemoteError::status(
                status.as_u16(),
                format!("Gemini API request failed\n\nStatus: {}\nBody: {}", status, excerpt),
            ));
        }

        let bytes = response.bytes().await?;
        let gemini_response: GeminiResponse = serde_json::from_slice(&bytes).map_err(|e| {
            RemoteError::malformed(format!("Failed to parse Gemini API response: {}", e))
        })?;

        let reply = Self::reply_text(gemini_response)?;
        tracing::debug!(chars = reply.chars().count(), "Received reply from Gemini API");
        Ok(reply)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Gemini API types

#[derive(Debug, Clone, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String, // "user" or "model"
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    // Non-text parts (functionCall etc.) decode with text = None
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}
