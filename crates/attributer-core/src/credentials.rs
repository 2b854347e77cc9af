//! Client-relay credential store.
//!
//! The user's own provider key lives in a local TOML file under a fixed key name and is
//! read at call time. Holding the key client-side is deliberate for this variant; the
//! gateway never sees it.

use std::fs;
use std::path::{Path, PathBuf};

use toml::Table;

use crate::error::CredentialError;

/// Fixed key name inside the store.
pub const ANTHROPIC_CREDENTIAL_KEY: &str = "anthropic_api_key";
/// Prefix every Anthropic API key carries.
pub const ANTHROPIC_KEY_PREFIX: &str = "sk-ant-";

const DEFAULT_STORE_FILE: &str = "attributer_credentials.toml";

/// File-backed store for the provider credential.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Default path for the store (working directory).
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_STORE_FILE)
    }

    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<Table, CredentialError> {
        if !self.path.exists() {
            return Ok(Table::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str::<Table>(&content)?)
    }

    fn write_table(&self, table: &Table) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, toml::to_string_pretty(table)?)?;
        Ok(())
    }

    /// Validate and persist. Values without the provider prefix are rejected and
    /// nothing is written.
    pub fn save(&self, credential: &str) -> Result<(), CredentialError> {
        let credential = credential.trim();
        if !credential.starts_with(ANTHROPIC_KEY_PREFIX) {
            return Err(CredentialError::InvalidPrefix(ANTHROPIC_KEY_PREFIX));
        }
        let mut table = self.read_table()?;
        table.insert(
            ANTHROPIC_CREDENTIAL_KEY.to_string(),
            toml::Value::String(credential.to_string()),
        );
        self.write_table(&table)?;
        tracing::info!(path = %self.path.display(), "provider credential saved");
        Ok(())
    }

    pub fn load(&self) -> Result<Option<String>, CredentialError> {
        let table = self.read_table()?;
        Ok(table
            .get(ANTHROPIC_CREDENTIAL_KEY)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty()))
    }

    /// Remove the stored credential. Returns whether one was present.
    pub fn remove(&self) -> Result<bool, CredentialError> {
        let mut table = self.read_table()?;
        let removed = table.remove(ANTHROPIC_CREDENTIAL_KEY).is_some();
        if removed {
            self.write_table(&table)?;
            tracing::info!(path = %self.path.display(), "provider credential removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_prefix_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("creds.toml"));
        let err = store.save("sk-or-v1-abc").unwrap_err();
        assert!(matches!(err, CredentialError::InvalidPrefix("sk-ant-")));
        assert!(!store.path().exists());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn saved_key_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("creds.toml");
        CredentialStore::open(&path).save("  sk-ant-api03-xyz \n").unwrap();

        let reopened = CredentialStore::open(&path);
        assert_eq!(reopened.load().unwrap().as_deref(), Some("sk-ant-api03-xyz"));
    }

    #[test]
    fn remove_clears_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(dir.path().join("creds.toml"));
        assert!(!store.remove().unwrap());
        store.save("sk-ant-1").unwrap();
        assert!(store.remove().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }
}
