// Visible chat feed
//
// What the chat screen shows: the user's messages and the bot's replies, with
// failures rendered in place of a reply. Separate from the session history,
// which only holds successful exchanges.

use serde::{Deserialize, Serialize};

use super::session::ChatSession;
use crate::errors::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub speaker: Speaker,
    pub text: String,
    /// Set when the bot entry stands in for a failed reply
    #[serde(default)]
    pub is_error: bool,
}

impl FeedEntry {
    fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            is_error: false,
        }
    }

    fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
            is_error: false,
        }
    }

    fn error(err: &ChatError) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: format!("Error: {}", err),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatFeed {
    entries: Vec<FeedEntry>,
}

impl ChatFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `input` through the session and record both sides.
    ///
    /// Blank input is ignored and returns `None`. Otherwise returns the bot
    /// entry, which is the reply or an `Error: ...` line.
    pub async fn submit(&mut self, session: &ChatSession, input: &str) -> Option<&FeedEntry> {
        if input.trim().is_empty() {
            return None;
        }

        self.entries.push(FeedEntry::user(input));

        let entry = match session.send_turn(input).await {
            Ok(reply) => FeedEntry::bot(reply),
            Err(e) => FeedEntry::error(&e),
        };
        self.entries.push(entry);
        self.entries.last()
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
