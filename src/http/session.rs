use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, warn};

use super::error::ApiError;

const KEYRING_SERVICE: &str = "tunelink";
const KEYRING_USER: &str = "session";

/// Where the bearer token lives between runs.
pub trait TokenVault: Send + Sync {
    fn load(&self) -> Result<Option<String>, ApiError>;
    fn store(&self, token: &str) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;
}

pub struct KeyringVault;

impl KeyringVault {
    fn entry() -> Result<keyring::Entry, ApiError> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|e| ApiError::Keyring(e.to_string()))
    }
}

impl TokenVault for KeyringVault {
    fn load(&self) -> Result<Option<String>, ApiError> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ApiError::Keyring(e.to_string())),
        }
    }

    fn store(&self, token: &str) -> Result<(), ApiError> {
        Self::entry()?
            .set_password(token)
            .map_err(|e| ApiError::Keyring(e.to_string()))
    }

    fn clear(&self) -> Result<(), ApiError> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ApiError::Keyring(e.to_string())),
        }
    }
}

/// In-process vault; nothing survives a restart.
#[derive(Default)]
pub struct MemoryVault {
    token: ArcSwapOption<String>,
}

impl TokenVault for MemoryVault {
    fn load(&self) -> Result<Option<String>, ApiError> {
        Ok(self.token.load_full().map(|t| t.as_ref().clone()))
    }

    fn store(&self, token: &str) -> Result<(), ApiError> {
        self.token.store(Some(Arc::new(token.to_string())));
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        self.token.store(None);
        Ok(())
    }
}

pub struct SessionStore {
    token: ArcSwapOption<String>,
    vault: Box<dyn TokenVault>,
}

impl SessionStore {
    pub fn new(vault: Box<dyn TokenVault>) -> Self {
        Self {
            token: ArcSwapOption::empty(),
            vault,
        }
    }

    /// An explicit token (from the environment) takes priority over the vault.
    pub fn restore(&self, explicit: Option<String>) -> bool {
        let token = match explicit {
            Some(token) => Some(token),
            None => match self.vault.load() {
                Ok(token) => token,
                Err(e) => {
                    warn!(error = %e, "session_restore_failed");
                    None
                }
            },
        };

        debug!(restored = token.is_some(), "session_restore");
        self.token.store(token.map(Arc::new));
        self.is_authenticated()
    }

    pub fn begin(&self, token: String) {
        if let Err(e) = self.vault.store(&token) {
            warn!(error = %e, "session_persist_failed");
        }
        self.token.store(Some(Arc::new(token)));
    }

    pub fn end(&self) {
        if let Err(e) = self.vault.clear() {
            warn!(error = %e, "session_clear_failed");
        }
        self.token.store(None);
    }

    pub fn token(&self) -> Option<Arc<String>> {
        self.token.load_full()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.load().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_token_wins_over_vault() {
        let vault = MemoryVault::default();
        vault.store("stored").unwrap();
        let session = SessionStore::new(Box::new(vault));

        assert!(session.restore(Some("explicit".into())));
        assert_eq!(session.token().as_deref().map(String::as_str), Some("explicit"));
    }

    #[test]
    fn begin_and_end_round_trip_through_vault() {
        let session = SessionStore::new(Box::new(MemoryVault::default()));
        assert!(!session.restore(None));

        session.begin("t1".into());
        assert!(session.is_authenticated());
        assert!(session.restore(None));

        session.end();
        assert!(!session.is_authenticated());
        assert!(!session.restore(None));
    }
}
