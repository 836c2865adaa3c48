// Conversation core
//
// Transcript building, bounded exchange history, the serialized chat session
// and the caller-side chat feed.

mod feed;
mod history;
mod session;
mod transcript;

pub use feed::{ChatFeed, FeedEntry, Speaker};
pub use history::{Exchange, ExchangeLog, HistoryLimits};
pub use session::ChatSession;
pub use transcript::{Role, Transcript, Turn};
