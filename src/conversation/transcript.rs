// Role-tagged turns and the transcript sent with every request

use serde::{Deserialize, Serialize};

use super::history::Exchange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// The full outgoing conversation for one request.
///
/// Layout: preamble (system turns), then one user/assistant pair per recorded
/// exchange in insertion order, then exactly one trailing user turn. Built
/// only through [`Transcript::build`]; there are no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
    preamble_len: usize,
}

impl Transcript {
    pub fn build<'a>(
        preamble: &[Turn],
        exchanges: impl IntoIterator<Item = &'a Exchange>,
        message: impl Into<String>,
    ) -> Self {
        let exchanges = exchanges.into_iter();
        let mut turns = Vec::with_capacity(preamble.len() + 2 * exchanges.size_hint().0 + 1);

        // Preamble is always system-role, whatever the caller passed in
        turns.extend(preamble.iter().map(|t| Turn::system(t.text.clone())));

        for exchange in exchanges {
            turns.push(Turn::user(exchange.user_text.clone()));
            turns.push(Turn::assistant(exchange.assistant_text.clone()));
        }

        turns.push(Turn::user(message));

        Self {
            turns,
            preamble_len: preamble.len(),
        }
    }

    /// All turns in send order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn preamble(&self) -> &[Turn] {
        &self.turns[..self.preamble_len]
    }

    /// Reconstructed user/assistant pairs, excluding the pending message
    pub fn history(&self) -> &[Turn] {
        &self.turns[self.preamble_len..self.turns.len() - 1]
    }

    /// The unanswered user turn being sent
    pub fn pending(&self) -> &Turn {
        // build() always pushes the pending turn last
        &self.turns[self.turns.len() - 1]
    }

    /// Number of prior exchanges included
    pub fn exchange_count(&self) -> usize {
        self.history().len() / 2
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Total characters across all turns
    pub fn char_count(&self) -> usize {
        self.turns.iter().map(|t| t.text.chars().count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_HISTORY: &[Exchange] = &[];

    fn preamble() -> Vec<Turn> {
        vec![Turn::system("You are Ramani."), Turn::system("Be brief.")]
    }

    #[test]
    fn test_build_without_history() {
        let transcript = Transcript::build(&preamble(), NO_HISTORY, "When to plant maize?");

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.preamble().len(), 2);
        assert!(transcript.history().is_empty());
        assert_eq!(transcript.pending(), &Turn::user("When to plant maize?"));
        assert_eq!(transcript.exchange_count(), 0);
    }

    #[test]
    fn test_build_alternates_history() {
        let exchanges = vec![
            Exchange::new("hello", "Hi, I am Ramani"),
            Exchange::new("rain tomorrow?", "Light showers"),
        ];
        let transcript = Transcript::build(&preamble(), &exchanges, "and Friday?");

        let roles: Vec<Role> = transcript.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
            ]
        );
        assert_eq!(transcript.history()[0].text, "hello");
        assert_eq!(transcript.history()[1].text, "Hi, I am Ramani");
        assert_eq!(transcript.history()[2].text, "rain tomorrow?");
        assert_eq!(transcript.history()[3].text, "Light showers");
        assert_eq!(transcript.pending().text, "and Friday?");
        assert_eq!(transcript.exchange_count(), 2);
    }

    #[test]
    fn test_preamble_forced_to_system_role() {
        let odd = vec![Turn::user("persona line")];
        let transcript = Transcript::build(&odd, NO_HISTORY, "hi");
        assert_eq!(transcript.preamble()[0], Turn::system("persona line"));
    }

    #[test]
    fn test_char_count() {
        let transcript = Transcript::build(&[Turn::system("ab")], NO_HISTORY, "cde");
        assert_eq!(transcript.char_count(), 5);
    }
}
