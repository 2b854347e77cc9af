//! Responder — one question in, one ResponseSet out, via a single model call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{FormatError, ResponderError};
use crate::response::{extract_response_set, ResponseSet};
use crate::style_profile::StyleProfile;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Everything a provider needs for one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub user: String,
}

/// First content block of a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    /// Any non-text block; carries the block type for diagnostics.
    Other(String),
}

/// Seam between the Responder and an external model API.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ResponderError>;
}

/// Builds the request from the StyleProfile and question, calls the provider and
/// parses the structured result.
#[derive(Clone)]
pub struct Responder {
    provider: Arc<dyn CompletionProvider>,
    profile: StyleProfile,
    model: String,
    max_tokens: u32,
}

impl Responder {
    pub fn new(provider: Arc<dyn CompletionProvider>, profile: StyleProfile) -> Self {
        Self {
            provider,
            profile,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    /// Build the outbound request. Blank questions are rejected here, before any call.
    pub fn build_request(&self, question: &str) -> Result<CompletionRequest, ResponderError> {
        if question.trim().is_empty() {
            return Err(ResponderError::Validation("Question is required".to_string()));
        }

        let user = format!(
            "Journalist question: \"{}\"\n\n\
             Generate a response as {} in all three versions. \
             Remember to follow all tone rules, formatting rules, and regulatory considerations. \
             Output valid JSON only: one object with exactly the keys \
             \"version1\", \"version2\", \"version3\" and \"recommendation\".",
            question,
            self.profile.persona_name()
        );

        Ok(CompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: self.profile.instructions().to_string(),
            user,
        })
    }

    /// Answer one question. Await completion or fail; never returns a partial ResponseSet.
    pub async fn respond(&self, question: &str) -> Result<ResponseSet, ResponderError> {
        let request = self.build_request(question)?;
        tracing::debug!(
            model = %request.model,
            question_len = question.len(),
            "requesting completion"
        );

        let text = match self.provider.complete(&request).await? {
            Completion::Text(text) => text,
            Completion::Other(kind) => {
                tracing::warn!(block = %kind, "model returned a non-text block");
                return Err(FormatError::NonText(kind).into());
            }
        };

        extract_response_set(&text).map_err(|e| {
            tracing::warn!(error = %e, "could not parse model output");
            ResponderError::Format(e)
        })
    }
}
