//! Key/value backends for the persisted session
//!
//! The session is two string keys. [`FileBackend`] keeps them in a JSON
//! object on disk, [`KeyringBackend`] stores each key as its own entry in the
//! OS credential store, and [`MemoryBackend`] keeps them in process memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use directories::ProjectDirs;

use crate::error::{PawfectError, Result};

/// Persistent string key/value storage scoped to the current user
pub trait SessionBackend: Send + Sync {
    /// Returns the value for `key`, or `None` if unset
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileBackend
// ---------------------------------------------------------------------------

/// JSON file holding all keys in one object
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Uses `session.json` in the per-user data directory.
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "pawfect", "pawfect").ok_or_else(|| {
            PawfectError::Session("Could not determine data directory".to_string())
        })?;
        Ok(Self::with_path(proj_dirs.data_dir().join("session.json")))
    }

    /// Uses the given file; its parent directory is created on first write.
    ///
    /// # Examples
    ///
    /// ```
    /// use pawfect::session::{FileBackend, SessionBackend};
    ///
    /// let dir = std::env::temp_dir().join("pawfect-doc-session");
    /// let backend = FileBackend::with_path(dir.join("session.json"));
    /// backend.set("k", "v").unwrap();
    /// assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
    /// ```
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// File the session is stored in
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read session file")
            .map_err(|e| PawfectError::Session(format!("{:#}", e)))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            PawfectError::Session(format!(
                "Corrupt session file {}: {}",
                self.path.display(),
                e
            ))
            .into()
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if values.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)
                    .context("Failed to remove session file")
                    .map_err(|e| PawfectError::Session(format!("{:#}", e)))?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")
                .map_err(|e| PawfectError::Session(format!("{:#}", e)))?;
        }
        let json = serde_json::to_string_pretty(values)?;

        // Written beside the target and renamed over it so the session file
        // never exists with wider permissions or partial contents.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        write_private(&tmp, json.as_bytes())
            .and_then(|()| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                let _ = std::fs::remove_file(&tmp);
                e
            })
            .context("Failed to write session file")
            .map_err(|e| PawfectError::Session(format!("{:#}", e)))?;
        Ok(())
    }
}

/// Writes `contents` to a file readable only by the current user
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // The mode above only applies when the file is created.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.sync_all()
}

impl SessionBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// KeyringBackend
// ---------------------------------------------------------------------------

/// OS credential store (Keychain, Secret Service, Credential Manager)
///
/// Each key is stored as a separate entry under the `pawfect` service.
pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    /// Uses the default `pawfect` service name.
    pub fn new() -> Self {
        Self::with_service("pawfect")
    }

    /// Uses a custom service name, mainly to isolate tests.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, key).map_err(PawfectError::Keyring)?)
    }
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBackend for KeyringBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(PawfectError::Keyring(e).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(PawfectError::Keyring)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(PawfectError::Keyring(e).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// In-process storage; nothing survives the process
#[derive(Default)]
pub struct MemoryBackend {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| PawfectError::Session("session lock poisoned".to_string()).into())
    }
}

impl SessionBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
