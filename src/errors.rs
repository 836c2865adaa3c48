// Error taxonomy for the conversation core
//
// The library surfaces typed errors so callers (the REPL, the chat feed) can
// tell a blank message from a busy session from a remote failure. The binary
// and the config loader use anyhow on top of these.

use thiserror::Error;

/// Why a remote round trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFailure {
    /// Connection refused, DNS failure, TLS error, body read error
    Unreachable,
    /// The round trip exceeded the configured request timeout
    Timeout,
    /// The service answered with a non-success HTTP status
    Status(u16),
    /// The service answered 2xx but the body had no reply text
    Malformed,
}

/// Failure talking to the completion service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: RemoteFailure,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(RemoteFailure::Unreachable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RemoteFailure::Timeout, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(RemoteFailure::Status(code), message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(RemoteFailure::Malformed, message)
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// Rate limiting (429) and server-side errors (5xx) are transient, as are
    /// transport failures and timeouts. Client errors and malformed bodies are not.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            RemoteFailure::Unreachable | RemoteFailure::Timeout => true,
            RemoteFailure::Status(code) => code == 429 || (500..600).contains(&code),
            RemoteFailure::Malformed => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("Request to completion service timed out: {}", err))
        } else if err.is_decode() {
            Self::malformed(format!("Failed to decode completion response: {}", err))
        } else {
            Self::unreachable(format!("Unable to connect to completion service: {}", err))
        }
    }
}

/// Errors returned by [`crate::conversation::ChatSession::send_turn`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message is empty")]
    InvalidInput,

    #[error(transparent)]
    RemoteService(#[from] RemoteError),

    #[error("Still answering the previous message, please wait")]
    ConcurrentCallRejected,
}

impl ChatError {
    /// The remote failure kind, if this is a remote error
    pub fn remote_kind(&self) -> Option<RemoteFailure> {
        match self {
            ChatError::RemoteService(e) => Some(e.kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
