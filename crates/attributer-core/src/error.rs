//! Error types for the attributer.

use thiserror::Error;

/// Coarse classification used at request boundaries (HTTP status, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Upstream,
    Format,
}

/// The model replied, but not in a shape we can turn into a ResponseSet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("model returned a non-text content block ({0})")]
    NonText(String),

    #[error("no JSON object found in model output")]
    NoJson,

    #[error("invalid JSON in model output: {0}")]
    InvalidJson(String),

    #[error("model output JSON is not an object")]
    NotAnObject,

    #[error("model output is missing key `{0}`")]
    MissingKey(&'static str),

    #[error("model output key `{0}` is not a string")]
    NotAString(&'static str),

    #[error("model output key `{0}` is empty")]
    EmptyField(&'static str),
}

/// Errors from a single Responder call.
#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upstream(String),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl ResponderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResponderError::Validation(_) => ErrorKind::Validation,
            ResponderError::Upstream(_) => ErrorKind::Upstream,
            ResponderError::Format(_) => ErrorKind::Format,
        }
    }

    /// Message safe to show an end user. Format failures never echo model text.
    pub fn public_message(&self) -> String {
        match self {
            ResponderError::Validation(msg) | ResponderError::Upstream(msg) => msg.clone(),
            ResponderError::Format(FormatError::NonText(_)) => {
                "Unexpected response format".to_string()
            }
            ResponderError::Format(_) => "Failed to parse AI response".to_string(),
        }
    }
}

/// Errors from the sequential batch driver. The batch aborts at the first failure.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Please enter at least one question")]
    Empty,

    #[error("question {} failed: {source}", .index + 1)]
    Question {
        index: usize,
        question: String,
        #[source]
        source: ResponderError,
    },

    #[error("batch cancelled after {completed} of {total} questions")]
    Cancelled { completed: usize, total: usize },
}

/// Session gate mismatch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Incorrect password")]
    IncorrectPassword,
}

/// Local credential store failures (client-relay variant).
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("credential must start with `{0}`")]
    InvalidPrefix(&'static str),

    #[error("credential store I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store is not valid TOML: {0}")]
    Decode(#[from] toml::de::Error),

    #[error("credential store could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),
}
