//! Credential check and selection, injected into the studio.

use crate::error::{AdGeniusError, Result};
use async_trait::async_trait;

/// Host capability that knows whether an API credential has been chosen.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns true if a credential is currently selected.
    async fn has_credential(&self) -> Result<bool>;

    /// Asks the user (or host) to select a credential.
    async fn select_credential(&self) -> Result<()>;
}

/// Credential backed by the `GOOGLE_API_KEY` / `API_KEY` environment variables.
///
/// Selection cannot prompt from inside the library, so it re-reads the
/// environment and fails with a hint when no key is present.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials;

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn has_credential(&self) -> Result<bool> {
        Ok(crate::google::resolve_api_key(None).is_some())
    }

    async fn select_credential(&self) -> Result<()> {
        if crate::google::resolve_api_key(None).is_some() {
            return Ok(());
        }
        Err(AdGeniusError::Auth(
            "no API key selected: set GOOGLE_API_KEY to a key from a billing-enabled project"
                .into(),
        ))
    }
}

/// Credential with a fixed answer, for embedding hosts that manage keys
/// themselves.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    selected: bool,
}

impl StaticCredentials {
    /// A credential that is always selected.
    pub fn selected() -> Self {
        Self { selected: true }
    }

    /// A credential that is never selected and cannot be selected.
    pub fn missing() -> Self {
        Self { selected: false }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn has_credential(&self) -> Result<bool> {
        Ok(self.selected)
    }

    async fn select_credential(&self) -> Result<()> {
        if self.selected {
            Ok(())
        } else {
            Err(AdGeniusError::Auth("credential selection is unavailable".into()))
        }
    }
}
