// Persona: the fixed preamble that opens every transcript
//
// The assistant's name, audience and constraints are expressed as a short list
// of system turns. They are sent ahead of the conversation on every call.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::conversation::Turn;

/// A persona defines how the assistant should behave
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Persona name (e.g., "Ramani")
    pub name: String,

    /// Description of this persona
    #[serde(default)]
    pub description: String,

    /// Preamble lines, each sent as one system turn, in order
    pub preamble: Vec<String>,
}

impl Persona {
    /// Load persona from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read persona from {}", path.display()))?;

        let persona: Persona = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse persona TOML in {}", path.display()))?;
        persona.validate()?;
        Ok(persona)
    }

    /// A persona must open the transcript with at least one non-blank line.
    pub fn validate(&self) -> Result<()> {
        if self.preamble.is_empty() {
            bail!("Persona '{}' has an empty preamble", self.name);
        }
        if let Some(i) = self.preamble.iter().position(|line| line.trim().is_empty()) {
            bail!("Persona '{}' has a blank preamble line at index {}", self.name, i);
        }
        Ok(())
    }

    /// Preamble as system turns
    pub fn to_preamble(&self) -> Vec<Turn> {
        self.preamble.iter().map(Turn::system).collect()
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "Ramani".to_string(),
            description: "AgriCare farming assistant".to_string(),
            preamble: vec![
                "You are a helpful assistant named Ramani on the AgriCare platform. \
                 Your role is to provide information and help farmers with their \
                 questions and concerns."
                    .to_string(),
                "You are knowledgeable about farming practices, crops, soil, weather \
                 and plant diseases."
                    .to_string(),
                "You are friendly and approachable. The person talking to you may have \
                 limited English, so understand partial English and avoid complex words. \
                 Mention your name in conversation only, never in brackets."
                    .to_string(),
            ],
        }
    }
}
