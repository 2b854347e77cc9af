//! Relay configuration: defaults, optional TOML file, then `ATTRIBUTER__*` environment.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | bind_addr | 127.0.0.1:3000 | Gateway listen address. |
//! | base_path | "" | Mount point for every gateway route (e.g. `/alex-pr-attributer`). |
//! | model | claude-sonnet-4-20250514 | Model identifier sent to the provider. |
//! | max_tokens | 4096 | Output length bound per call. |
//! | api_base_url | https://api.anthropic.com | Provider host. |
//! | request_timeout_secs | 60 | Per-call timeout; expiry is an upstream failure. |
//! | gate_password | hokku123 | Session gate constant. Not a secret. |
//! | persona_name | Alex Svanevik | Name used in the user message. |
//! | style_profile_path | unset | Replacement instruction file; embedded profile otherwise. |
//! | credential_path | unset | Desk credential store; `attributer_credentials.toml` otherwise. |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::anthropic::{ANTHROPIC_API_BASE, DEFAULT_TIMEOUT};
use crate::credentials::CredentialStore;
use crate::responder::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::session::{SessionGate, DEFAULT_GATE_PASSWORD};
use crate::style_profile::{StyleProfile, DEFAULT_PERSONA_NAME};

const DEFAULT_CONFIG_PATH: &str = "config/attributer.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    pub bind_addr: String,
    #[serde(default)]
    pub base_path: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub gate_password: String,
    pub persona_name: String,
    #[serde(default)]
    pub style_profile_path: Option<String>,
    #[serde(default)]
    pub credential_path: Option<String>,
}

impl RelayConfig {
    /// Load from `ATTRIBUTER_CONFIG` (or `config/attributer.toml` if present) and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("ATTRIBUTER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(Some(&path))
    }

    /// Load with an explicit file. A missing file is skipped, not an error.
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("bind_addr", "127.0.0.1:3000")?
            .set_default("base_path", "")?
            .set_default("model", DEFAULT_MODEL)?
            .set_default("max_tokens", i64::from(DEFAULT_MAX_TOKENS))?
            .set_default("api_base_url", ANTHROPIC_API_BASE)?
            .set_default("request_timeout_secs", DEFAULT_TIMEOUT.as_secs() as i64)?
            .set_default("gate_password", DEFAULT_GATE_PASSWORD)?
            .set_default("persona_name", DEFAULT_PERSONA_NAME)?;

        let builder = match path {
            Some(p) if p.exists() => builder.add_source(config::File::from(p)),
            _ => builder,
        };

        let mut cfg: Self = builder
            .add_source(config::Environment::with_prefix("ATTRIBUTER").separator("__"))
            .build()?
            .try_deserialize()?;
        cfg.base_path = normalize_base_path(&cfg.base_path);
        Ok(cfg)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn gate(&self) -> SessionGate {
        SessionGate::new(self.gate_password.clone())
    }

    /// Embedded profile unless `style_profile_path` points at a replacement.
    pub fn style_profile(&self) -> std::io::Result<StyleProfile> {
        match &self.style_profile_path {
            Some(p) => StyleProfile::from_file(&self.persona_name, p),
            None => Ok(StyleProfile::new(
                self.persona_name.clone(),
                StyleProfile::embedded().instructions(),
            )),
        }
    }

    pub fn credential_store(&self) -> CredentialStore {
        match &self.credential_path {
            Some(p) => CredentialStore::open(p),
            None => CredentialStore::open(CredentialStore::default_path()),
        }
    }
}

/// `""`, `"/"` → `""`; `"x/"` → `"/x"`.
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
