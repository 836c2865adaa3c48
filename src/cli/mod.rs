// Terminal front end: REPL, slash commands, session wiring

pub mod commands;
pub mod repl;

pub use commands::{handle_command, Command};
pub use repl::Repl;

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::conversation::ChatSession;
use crate::providers::create_provider;

/// Build a session for the configured provider
pub fn build_session(config: &Config) -> Result<Arc<ChatSession>> {
    let provider = create_provider(&config.provider)?;
    Ok(Arc::new(ChatSession::from_config(provider, config)))
}
