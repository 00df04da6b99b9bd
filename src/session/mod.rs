//! Persisted sign-in session
//!
//! [`SessionStore`] is the only place that reads or writes the bearer token
//! and user profile. Its presence decides whether the chat and conversation
//! commands may run.

pub mod backend;

pub use backend::{FileBackend, KeyringBackend, MemoryBackend, SessionBackend};

use crate::api::User;
use crate::config::{SessionBackendKind, SessionConfig};
use crate::error::{PawfectError, Result};

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "pawfect_token";

/// Key holding the `{name, email}` JSON profile
pub const USER_KEY: &str = "pawfect_user";

/// Token and profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token
    pub token: String,
    /// Profile, if one was stored alongside the token
    pub user: Option<User>,
}

/// Accessor for the persisted credential
///
/// # Examples
///
/// ```
/// use pawfect::session::{MemoryBackend, SessionStore};
///
/// let store = SessionStore::new(Box::new(MemoryBackend::new()));
/// assert!(!store.is_authenticated().unwrap());
///
/// store.establish("tok", "Ada", "ada@example.com").unwrap();
/// assert!(store.is_authenticated().unwrap());
/// assert_eq!(store.current_user().unwrap().unwrap().name, "Ada");
///
/// store.clear().unwrap();
/// assert!(store.current_user().unwrap().is_none());
/// ```
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
}

impl SessionStore {
    /// Wraps an explicit backend
    pub fn new(backend: Box<dyn SessionBackend>) -> Self {
        Self { backend }
    }

    /// Opens the backend selected in configuration
    ///
    /// # Errors
    ///
    /// Returns `PawfectError::Session` if the default data directory cannot
    /// be determined for the file backend.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let backend: Box<dyn SessionBackend> = match config.backend {
            SessionBackendKind::File => match &config.file_path {
                Some(path) => Box::new(FileBackend::with_path(path)),
                None => Box::new(FileBackend::new()?),
            },
            SessionBackendKind::Keyring => Box::new(KeyringBackend::new()),
            SessionBackendKind::Memory => Box::new(MemoryBackend::new()),
        };
        tracing::debug!(backend = ?config.backend, "Opened session store");
        Ok(Self::new(backend))
    }

    /// True iff a token is stored
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.backend.get(TOKEN_KEY)?.is_some())
    }

    /// Profile of the signed-in user
    ///
    /// A profile that fails to parse is treated as absent.
    pub fn current_user(&self) -> Result<Option<User>> {
        let Some(raw) = self.backend.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored user profile: {}", e);
                Ok(None)
            }
        }
    }

    /// Token and profile together, `None` when signed out
    pub fn credential(&self) -> Result<Option<Session>> {
        let Some(token) = self.backend.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        Ok(Some(Session {
            token,
            user: self.current_user()?,
        }))
    }

    /// Like [`SessionStore::credential`] but fails when signed out
    ///
    /// # Errors
    ///
    /// Returns `PawfectError::NotAuthenticated` when no token is stored.
    pub fn require(&self) -> Result<Session> {
        self.credential()?
            .ok_or_else(|| PawfectError::NotAuthenticated.into())
    }

    /// Stores a freshly issued credential
    pub fn establish(&self, token: &str, name: &str, email: &str) -> Result<()> {
        let user = User {
            name: name.to_string(),
            email: email.to_string(),
        };
        self.backend.set(TOKEN_KEY, token)?;
        self.backend.set(USER_KEY, &serde_json::to_string(&user)?)?;
        tracing::info!(email = %email, "Session established");
        Ok(())
    }

    /// Removes the token and profile (logout)
    pub fn clear(&self) -> Result<()> {
        self.backend.remove(TOKEN_KEY)?;
        self.backend.remove(USER_KEY)?;
        tracing::info!("Session cleared");
        Ok(())
    }
}
