// Chat session: the conversation context manager
//
// Owns the exchange history, rebuilds the full transcript for every message,
// and serializes calls so each request sees the history the previous one left.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::history::{Exchange, ExchangeLog, HistoryLimits};
use super::transcript::{Transcript, Turn};
use crate::config::constants::{DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::config::{BusyPolicy, Config, Persona};
use crate::errors::{ChatError, RemoteError, Result};
use crate::providers::{with_retry, CompletionProvider, CompletionRequest, RetryPolicy};

/// One logical conversation with the remote model.
///
/// Share across tasks with `Arc<ChatSession>`; at most one `send_turn` runs at
/// a time, per [`BusyPolicy`].
pub struct ChatSession {
    provider: Arc<dyn CompletionProvider>,
    preamble: Vec<Turn>,
    /// Held for the whole round trip; at most one call outstanding
    in_flight: Mutex<()>,
    /// Held only to read or append, never across the network call
    history: Mutex<ExchangeLog>,
    busy_policy: BusyPolicy,
    max_output_tokens: u32,
    request_timeout: Duration,
    retry: RetryPolicy,
}

impl ChatSession {
    /// Session with the default persona and built-in limits
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            preamble: Persona::default().to_preamble(),
            in_flight: Mutex::new(()),
            history: Mutex::new(ExchangeLog::new(Config::default().session.history_limits())),
            busy_policy: BusyPolicy::default(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry: RetryPolicy::none(),
        }
    }

    /// Session configured from a loaded [`Config`]
    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &Config) -> Self {
        Self::new(provider)
            .with_persona(&config.persona)
            .with_busy_policy(config.session.busy_policy)
            .with_history_limits(config.session.history_limits())
            .with_max_output_tokens(config.provider.max_output_tokens)
            .with_request_timeout(config.provider.request_timeout())
            .with_retry(config.session.retry_policy())
    }

    pub fn with_persona(mut self, persona: &Persona) -> Self {
        self.preamble = persona.to_preamble();
        self
    }

    pub fn with_busy_policy(mut self, policy: BusyPolicy) -> Self {
        self.busy_policy = policy;
        self
    }

    /// Replace retention limits; only valid before the first message
    pub fn with_history_limits(mut self, limits: HistoryLimits) -> Self {
        self.history = Mutex::new(ExchangeLog::new(limits));
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Send one user message with the full conversation as context.
    ///
    /// Blank messages fail with `InvalidInput` and send nothing. On success
    /// the exchange is recorded and the reply returned; on failure history is
    /// left untouched.
    pub async fn send_turn(&self, message: &str) -> Result<String> {
        if message.trim().is_empty() {
            tracing::debug!("Ignoring blank message");
            return Err(ChatError::InvalidInput);
        }

        let _in_flight = match self.busy_policy {
            BusyPolicy::Reject => self.in_flight.try_lock().map_err(|_| {
                tracing::warn!("Rejected message: previous message still in flight");
                ChatError::ConcurrentCallRejected
            })?,
            BusyPolicy::Queue => self.in_flight.lock().await,
        };

        // History lock is released at the end of this statement
        let transcript = Transcript::build(&self.preamble, self.history.lock().await.iter(), message);
        let request = CompletionRequest::new(transcript, self.max_output_tokens);

        tracing::info!(
            provider = %self.provider.name(),
            model = %self.provider.model(),
            prior_exchanges = request.transcript.exchange_count(),
            turns = request.transcript.len(),
            chars = request.transcript.char_count(),
            "Sending turn"
        );

        let started = Instant::now();
        let reply = with_retry(&self.retry, || self.round_trip(&request))
            .await
            .map_err(|e| {
                tracing::warn!(
                    kind = ?e.kind,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Turn failed: {}",
                    e
                );
                e
            })?;

        let (evicted, retained) = {
            let mut history = self.history.lock().await;
            let evicted = history.push(Exchange::new(message, reply.clone()));
            (evicted, history.len())
        };

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            reply_chars = reply.chars().count(),
            retained,
            evicted,
            "Turn complete"
        );

        Ok(reply)
    }

    /// One attempt, bounded by the request timeout
    async fn round_trip(&self, request: &CompletionRequest) -> std::result::Result<String, RemoteError> {
        match tokio::time::timeout(self.request_timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::timeout(format!(
                "No reply from {} within {:?}",
                self.provider.name(),
                self.request_timeout
            ))),
        }
    }

    /// Whether a `send_turn` is currently outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Copy of the retained exchanges, oldest first
    pub async fn history_snapshot(&self) -> Vec<Exchange> {
        self.history.lock().await.to_vec()
    }

    pub async fn exchange_count(&self) -> usize {
        self.history.lock().await.len()
    }

    /// Exchanges dropped by retention limits so far
    pub async fn evicted_count(&self) -> usize {
        self.history.lock().await.evicted()
    }

    pub fn preamble(&self) -> &[Turn] {
        &self.preamble
    }

    pub fn busy_policy(&self) -> BusyPolicy {
        self.busy_policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }
}
