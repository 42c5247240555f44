//! Persisted session storage.
//!
//! Exactly two keys survive a reload: the bearer token and the serialized user. They are
//! written together on sign-in, the user alone on profile updates, and both are removed on
//! sign-out or a rejected token.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use stagedoor_common::User;

use crate::{cross_log, errors::PersistenceError};

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Key holding the JSON-serialized [`User`].
pub const USER_KEY: &str = "user";

/// Minimal string key-value store, the shape of browser `localStorage`.
pub trait KeyValueStore: Debug + Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Volatile store. Sessions end with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// One file per key inside a directory (native front-ends).
///
/// Treat the directory as holding a **bearer secret**. On Unix files are created `0o600`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let target = self.path(key);
        std::fs::write(&target, value)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o600))?;
        };
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Browser `window.localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| PersistenceError::Unavailable("localStorage is not accessible".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))
    }
}

/// Token + user persistence over any [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SessionPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl SessionPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored token, if any. Read failures count as "no token".
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                cross_log!(warn, "Could not read persisted token: {}", e);
                None
            }
        }
    }

    /// Stored token and user, only when both are present and readable.
    ///
    /// A half-written or corrupt pair is cleared and reported as no session, so a token is
    /// never held without its user.
    pub fn load(&self) -> Result<Option<(String, User)>, PersistenceError> {
        let token = self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let raw_user = self.store.get(USER_KEY)?;

        match (token, raw_user) {
            (None, None) => Ok(None),
            (Some(token), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Ok(Some((token, user))),
                Err(e) => {
                    cross_log!(warn, "Discarding corrupt persisted user: {}", e);
                    self.clear()?;
                    Ok(None)
                }
            },
            _ => {
                cross_log!(warn, "Discarding incomplete persisted session");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, token: &str, user: &User) -> Result<(), PersistenceError> {
        self.save_user(user)?;
        self.store.set(TOKEN_KEY, token)
    }

    pub fn save_user(&self, user: &User) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(user).map_err(|e| PersistenceError::Corrupt(e.to_string()))?;
        self.store.set(USER_KEY, &raw)
    }

    /// Remove both keys. Both removals are attempted even if the first fails.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        let token = self.store.remove(TOKEN_KEY);
        let user = self.store.remove(USER_KEY);
        token.and(user)
    }
}
