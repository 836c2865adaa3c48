// Project-wide constants
//
// Centralised here so defaults have one source of truth.
// Import via `use crate::config::constants::*;`.

/// Default Gemini model used for chat completions.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Base URL of the Generative Language REST API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upper bound on reply length, in output tokens.
///
/// Replies are read by farmers on a phone screen, so they are kept short.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 100;

/// Default timeout for one remote round trip.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of exchanges kept as context (0 = unlimited).
pub const DEFAULT_MAX_EXCHANGES: usize = 50;

/// Default cap on retained history characters (0 = unlimited).
pub const DEFAULT_MAX_HISTORY_CHARS: usize = 0;

/// Default number of attempts per message (1 = no automatic retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Base delay for exponential backoff between attempts.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Directory under $HOME holding config.toml.
pub const CONFIG_DIR_NAME: &str = ".ramani";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";
