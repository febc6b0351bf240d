//! Session state and its persistence.
//!
//! A [`Session`] is the client-held token and user profile. It is hydrated
//! from a [`SessionStore`] when the client starts and written back on every
//! change. The store holds exactly two string entries: [`TOKEN_KEY`] with the
//! bearer token and [`USER_KEY`] with the JSON-serialized profile.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::auth::User;
use crate::error::StorageError;

/// Store key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Store key holding the JSON user profile.
pub const USER_KEY: &str = "user";

// =============================================================================
// Session
// =============================================================================

/// Authentication state: Anonymous (no token) or Authenticated (token and
/// user).
#[derive(Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
    user: Option<User>,
}

impl Session {
    /// A session with no token and no user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session holding `token` and `user`.
    #[must_use]
    pub fn authenticated(token: SecretString, user: User) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    /// Load the session from `store`.
    ///
    /// A blank token entry counts as no token. A user entry that is not
    /// valid JSON, or does not describe a user, counts as no stored user. A
    /// store whose contents cannot be parsed at all hydrates as anonymous;
    /// the next write replaces it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the store itself cannot be read.
    pub fn hydrate(store: &dyn SessionStore) -> Result<Self, StorageError> {
        let entries = store
            .get(TOKEN_KEY)
            .and_then(|token| Ok((token, store.get(USER_KEY)?)));
        let (token, user) = match entries {
            Ok(entries) => entries,
            Err(StorageError::Format(err)) => {
                warn!(error = %err, "Session store is unreadable; starting logged out");
                return Ok(Self::anonymous());
            }
            Err(err) => return Err(err),
        };

        let token = token
            .filter(|token| !is_blank(token))
            .map(SecretString::from);

        let user = user.and_then(|raw| match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(error = %err, "Ignoring unreadable stored user profile");
                None
            }
        });

        Ok(Self { token, user })
    }

    /// Write both entries to `store`, removing any that are unset.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store rejects the write.
    pub fn persist(&self, store: &dyn SessionStore) -> Result<(), StorageError> {
        match &self.token {
            Some(token) => store.set(TOKEN_KEY, token.expose_secret())?,
            None => store.remove(TOKEN_KEY)?,
        }
        match &self.user {
            Some(user) => store.set(USER_KEY, &serde_json::to_string(user)?)?,
            None => store.remove(USER_KEY)?,
        }
        Ok(())
    }

    /// Remove both entries from `store`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store rejects the removal.
    pub fn clear_store(store: &dyn SessionStore) -> Result<(), StorageError> {
        store.remove(TOKEN_KEY)?;
        store.remove(USER_KEY)
    }

    /// The bearer token, if one is held and not blank.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(|token| token.expose_secret())
            .filter(|token| !is_blank(token))
    }

    /// Whether a token is held.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.bearer_token().is_some()
    }

    /// The stored user profile.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Replace the stored user profile, keeping the token.
    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Whether both a token and a user are held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.has_token() && self.user.is_some()
    }

    /// Whether the stored user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.bearer_token() == other.bearer_token() && self.user == other.user
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

/// Whether `token` is unusable as a bearer credential.
pub(crate) fn is_blank(token: &str) -> bool {
    token.trim().is_empty()
}

// =============================================================================
// Stores
// =============================================================================

/// String-keyed persistent storage for the session.
pub trait SessionStore: Send + Sync {
    /// Read an entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write an entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete an entry. Deleting a missing entry is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object file, e.g. `~/.shopfront/session.json`.
///
/// The file is re-read on every access so separate processes sharing it see
/// each other's logins and logouts. It is deleted once it holds no entries.
/// Writes replace the file atomically and leave it readable by its owner
/// only. A file that cannot be parsed is replaced by the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Use the file at `path`. It is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
                _ => Ok(()),
            };
        }

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        // Written beside the target and renamed over it, owner-only.
        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, entries)?;
        file.flush()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = lock(&self.write_lock);
        let mut entries = match self.read_entries() {
            Err(StorageError::Format(err)) => {
                warn!(path = %self.path.display(), error = %err, "Replacing unreadable session file");
                BTreeMap::new()
            }
            entries => entries?,
        };
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
