//! Session gate and ephemeral session state.
//!
//! The gate is access obfuscation, not security: the password is a fixed constant that
//! anyone holding the deployed artifact or its config can read.

use crate::error::GateError;
use crate::response::AnsweredQuestion;

pub const DEFAULT_GATE_PASSWORD: &str = "hokku123";

/// Plaintext password check in front of the question form.
#[derive(Debug, Clone)]
pub struct SessionGate {
    password: String,
}

impl SessionGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// Exact match; no trimming or case folding.
    pub fn check(&self, attempt: &str) -> Result<(), GateError> {
        if attempt == self.password {
            Ok(())
        } else {
            Err(GateError::IncorrectPassword)
        }
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new(DEFAULT_GATE_PASSWORD)
    }
}

/// Auth flag, cached credential and the current answer list. Lives for one run.
#[derive(Debug, Default)]
pub struct SessionState {
    authenticated: bool,
    credential: Option<String>,
    answers: Vec<AnsweredQuestion>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// On mismatch the session stays gated.
    pub fn unlock(&mut self, gate: &SessionGate, attempt: &str) -> Result<(), GateError> {
        gate.check(attempt)?;
        self.authenticated = true;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn set_credential(&mut self, credential: Option<String>) {
        self.credential = credential;
    }

    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Replace the answer list after a successful submission. Failed submissions never
    /// call this, so the previous answers stay visible.
    pub fn record(&mut self, answers: Vec<AnsweredQuestion>) {
        self.answers = answers;
    }

    pub fn answers(&self) -> &[AnsweredQuestion] {
        &self.answers
    }
}
