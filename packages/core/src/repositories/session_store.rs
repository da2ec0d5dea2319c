use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::models::session::{Session, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::repositories::errors::session_store_errors::SessionStoreError;

#[cfg(test)]
use mockall::automock;

/// The only owner of the persisted token pair.
///
/// `save` and `clear` are the sole mutation points; every other component
/// goes through this interface rather than the storage primitive.
#[cfg_attr(test, automock)]
pub trait SessionStore: Send + Sync {
    /// Overwrites both tokens.
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;
    /// Returns both tokens or neither.
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;
    /// Removes both tokens. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

fn to_entries(session: &Session) -> HashMap<String, String> {
    HashMap::from([
        (ACCESS_TOKEN_KEY.to_string(), session.access_token.clone()),
        (REFRESH_TOKEN_KEY.to_string(), session.refresh_token.clone()),
    ])
}

fn from_entries(entries: &HashMap<String, String>) -> Option<Session> {
    match (entries.get(ACCESS_TOKEN_KEY), entries.get(REFRESH_TOKEN_KEY)) {
        (Some(access), Some(refresh)) => Some(Session::new(access.clone(), refresh.clone())),
        (None, None) => None,
        _ => {
            warn!("Ignoring half-populated session storage");
            None
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-local store, used by tests and short-lived hosts.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: &Session) -> Self {
        InMemorySessionStore {
            entries: Mutex::new(to_entries(session)),
        }
    }

    /// Writes a single raw key, bypassing the pair contract. Only meant for
    /// reproducing legacy layouts left behind by older clients.
    pub fn insert_raw(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *lock(&self.entries) = to_entries(session);
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(from_entries(&lock(&self.entries)))
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        lock(&self.entries).clear();
        Ok(())
    }
}

/// Key/value session persisted as a JSON object on disk.
///
/// All I/O is blocking `std::fs`; service clients read it through
/// `spawn_blocking`.
pub struct FileSessionStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSessionStore {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_entries(&self) -> Result<HashMap<String, String>, SessionStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let _guard = lock(&self.guard);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(&to_entries(session))?;
        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        restrict_permissions(&temp)?;
        fs::rename(&temp, &self.path)?;
        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let _guard = lock(&self.guard);
        Ok(from_entries(&self.read_entries()?))
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let _guard = lock(&self.guard);
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Session cleared from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), SessionStoreError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), SessionStoreError> {
    Ok(())
}
