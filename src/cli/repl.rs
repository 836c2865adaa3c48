// Interactive chat REPL

use anyhow::Result;
use crossterm::style::Stylize;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::io::{self, IsTerminal};
use std::sync::Arc;

use crate::config::Config;
use crate::conversation::{ChatFeed, ChatSession, FeedEntry};
use crate::logging::ConversationLogger;

use super::commands::{handle_command, Command};

pub struct Repl {
    config: Config,
    session: Arc<ChatSession>,
    feed: ChatFeed,
    logger: Option<ConversationLogger>,
    is_interactive: bool,
}

impl Repl {
    pub fn new(config: Config, session: Arc<ChatSession>) -> Result<Self> {
        let logger = match &config.log_path {
            Some(path) => Some(ConversationLogger::new(path.clone())?),
            None => None,
        };

        Ok(Self {
            config,
            session,
            feed: ChatFeed::new(),
            logger,
            is_interactive: io::stdout().is_terminal(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;

        if self.is_interactive {
            println!(
                "{} - {} via {}/{}",
                self.config.persona.name.as_str().bold().green(),
                self.config.persona.description,
                self.session.provider_name(),
                self.session.model()
            );
            println!("Type /help for commands.");
        }

        loop {
            let line = match editor.readline("you> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            if line.trim().is_empty() {
                continue;
            }
            remember_line(editor.history_mut(), &line);

            if let Some(command) = Command::parse(&line) {
                if command == Command::Quit {
                    if self.is_interactive {
                        println!("Goodbye!");
                    }
                    break;
                }
                let output = handle_command(&command, &self.session, &self.config).await?;
                println!("{}", output);
                continue;
            }

            self.process_message(&line).await;
        }

        if let Some(logger) = self.logger.as_mut() {
            logger.flush()?;
        }
        Ok(())
    }

    async fn process_message(&mut self, input: &str) {
        let Some(entry) = self.feed.submit(&self.session, input).await.cloned() else {
            return;
        };

        self.print_entry(&entry);

        if entry.is_error {
            return;
        }
        if let Some(logger) = self.logger.as_mut() {
            let model = format!("{}/{}", self.session.provider_name(), self.session.model());
            if let Err(e) = logger.log_exchange(input, &entry.text, &model) {
                tracing::warn!("Failed to log exchange: {:#}", e);
            }
        }
    }

    fn print_entry(&self, entry: &FeedEntry) {
        let label = format!("{}>", self.config.persona.name.to_lowercase());
        if entry.is_error {
            println!("{} {}", label.bold().red(), entry.text.as_str().red());
        } else {
            println!("{} {}", label.bold().green(), entry.text);
        }
    }
}

/// Add a submitted line to the editor's recall history
fn remember_line(history: &mut impl History, line: &str) {
    if let Err(e) = history.add(line.trim()) {
        tracing::debug!("Failed to record line history: {}", e);
    }
}
