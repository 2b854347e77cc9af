//! StyleProfile — the persona, tone rules, factual context and compliance constraints
//! sent verbatim as system instructions on every model call.

use std::path::Path;
use std::sync::Arc;

/// Persona the embedded profile speaks as.
pub const DEFAULT_PERSONA_NAME: &str = "Alex Svanevik";

const EMBEDDED_INSTRUCTIONS: &str = include_str!("../assets/style_profile.md");

/// Immutable instruction block. Built once at startup and shared by every Responder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleProfile {
    persona_name: Arc<str>,
    instructions: Arc<str>,
}

impl StyleProfile {
    pub fn new(persona_name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            persona_name: Arc::from(persona_name.into()),
            instructions: Arc::from(instructions.into()),
        }
    }

    /// The profile baked into the binary.
    pub fn embedded() -> Self {
        Self::new(DEFAULT_PERSONA_NAME, EMBEDDED_INSTRUCTIONS.trim_end())
    }

    /// Load replacement instructions from a file (e.g. a revised persona brief).
    pub fn from_file(persona_name: &str, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(persona_name, text.trim_end()))
    }

    pub fn persona_name(&self) -> &str {
        &self.persona_name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self::embedded()
    }
}
