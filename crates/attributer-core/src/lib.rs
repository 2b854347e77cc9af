//! Alex PR Attributer — Core library.
//! Style profile, Responder (request building + JSON extraction), batch driver,
//! session gate and the client-relay credential store.

pub mod anthropic;
pub mod batch;
pub mod config;
pub mod credentials;
pub mod error;
pub mod responder;
pub mod response;
pub mod session;
pub mod style_profile;

pub use anthropic::AnthropicMessages;
pub use batch::{run_batch, split_questions};
pub use config::RelayConfig;
pub use credentials::{CredentialStore, ANTHROPIC_CREDENTIAL_KEY, ANTHROPIC_KEY_PREFIX};
pub use error::{BatchError, CredentialError, ErrorKind, FormatError, GateError, ResponderError};
pub use responder::{Completion, CompletionProvider, CompletionRequest, Responder};
pub use response::{extract_response_set, AnsweredQuestion, ResponseSet};
pub use session::{SessionGate, SessionState, DEFAULT_GATE_PASSWORD};
pub use style_profile::StyleProfile;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
