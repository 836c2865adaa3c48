// Ramani - farming assistant chat client
// Library exports

pub mod cli;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod logging;
pub mod providers;

pub use config::{BusyPolicy, Config, Persona, ProviderConfig};
pub use conversation::{ChatFeed, ChatSession, Exchange, HistoryLimits, Role, Transcript, Turn};
pub use errors::{ChatError, RemoteError, RemoteFailure};
pub use providers::{CompletionProvider, CompletionRequest, GeminiProvider};
