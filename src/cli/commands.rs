// Slash command handling

use anyhow::Result;

use crate::config::Config;
use crate::conversation::ChatSession;

/// Exchanges shown by /history
const HISTORY_PREVIEW: usize = 5;

/// Longest message preview shown by /history
const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    History,
    Config,
    Unknown(String),
}

impl Command {
    /// Parse a slash command; plain text returns None and is sent as a message
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if !input.starts_with('/') {
            return None;
        }
        match input {
            "/help" => Some(Command::Help),
            "/quit" | "/exit" => Some(Command::Quit),
            "/history" => Some(Command::History),
            "/config" => Some(Command::Config),
            other => Some(Command::Unknown(other.to_string())),
        }
    }
}

pub async fn handle_command(
    command: &Command,
    session: &ChatSession,
    config: &Config,
) -> Result<String> {
    match command {
        Command::Help => Ok(format_help()),
        Command::Quit => Ok("Goodbye!".to_string()),
        Command::History => Ok(format_history(session).await),
        Command::Config => config.to_redacted_toml(),
        Command::Unknown(name) => Ok(format!("Unknown command {}. Type /help for commands.", name)),
    }
}

fn format_help() -> String {
    r#"Available commands:
  /help      - Show this help message
  /history   - Show remembered conversation
  /config    - Show active configuration
  /quit      - Exit

Type any question to ask Ramani."#
        .to_string()
}

async fn format_history(session: &ChatSession) -> String {
    let exchanges = session.history_snapshot().await;
    let evicted = session.evicted_count().await;

    if exchanges.is_empty() {
        return "No conversation yet.".to_string();
    }

    let mut output = format!(
        "{} exchange(s) remembered, {} dropped as too old\n",
        exchanges.len(),
        evicted
    );

    let skip = exchanges.len().saturating_sub(HISTORY_PREVIEW);
    for exchange in &exchanges[skip..] {
        output.push_str(&format!(
            "\n[{}]\n  you:    {}\n  ramani: {}\n",
            exchange.recorded_at.format("%H:%M:%S"),
            preview(&exchange.user_text),
            preview(&exchange.assistant_text)
        ));
    }
    output
}

fn preview(text: &str) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() > PREVIEW_CHARS {
        let cut: String = single_line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        single_line
    }
}
