//! Key/value storage media for session state.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::AuthError;

const STORAGE_FILE_NAME: &str = "session.json";
const STORAGE_FILE_VERSION: u32 = 1;

/// Durable key/value medium the session is persisted to.
///
/// The host picks the implementation at construction time: [`FileStorage`]
/// for a real profile directory, [`MemoryStorage`] for a process-local
/// session, [`NoopStorage`] where nothing may be persisted.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;
    fn remove(&self, key: &str) -> Result<(), AuthError>;

    /// Write several entries. Implementations that can do so write them in a
    /// single step.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), AuthError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), AuthError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Storage that keeps nothing. Reads always miss; writes always succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl Storage for NoopStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, AuthError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), AuthError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AuthError> {
        self.entries
            .lock()
            .map_err(|_| AuthError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), AuthError> {
        let mut guard = self.lock()?;
        for (key, value) in entries {
            guard.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// File-backed storage: one JSON document replaced atomically on every write.
///
/// # Example
/// ```no_run
/// use stanza::auth::{FileStorage, Storage};
///
/// let storage = FileStorage::new(std::path::PathBuf::from("/tmp/stanza"));
/// storage.set("accessToken", "abc")?;
/// # Ok::<(), stanza::auth::AuthError>(())
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Store under `dir/session.json`.
    pub fn new(dir: PathBuf) -> Self {
        Self::at_path(dir.join(STORAGE_FILE_NAME))
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<Option<String>, AuthError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AuthError::Storage(err.to_string())),
        }
    }

    /// Entries of a parsed session file, refusing versions this build does
    /// not write.
    fn entries_from(&self, value: serde_json::Value) -> Result<BTreeMap<String, String>, AuthError> {
        let version = value.get("version").and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(STORAGE_FILE_VERSION)) {
            return Err(AuthError::Storage(format!(
                "Unsupported session file version {} at {}",
                version.map_or_else(|| "(none)".to_string(), |v| v.to_string()),
                self.path.display()
            )));
        }
        let file: StorageFile = serde_json::from_value(value)?;
        Ok(file.entries)
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, AuthError> {
        let Some(raw) = self.read_raw()? else {
            return Ok(BTreeMap::new());
        };
        self.entries_from(serde_json::from_str(&raw)?)
    }

    fn update<F>(&self, apply: F) -> Result<(), AuthError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AuthError::Storage("file storage lock poisoned".to_string()))?;
        // Only a file that is not valid JSON gets replaced.
        let mut entries = match self.read_raw()? {
            None => BTreeMap::new(),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => self.entries_from(value)?,
                Err(error) => {
                    warn!(%error, path = %self.path.display(), "Replacing unreadable session file");
                    BTreeMap::new()
                }
            },
        };
        apply(&mut entries);
        let file = StorageFile {
            version: STORAGE_FILE_VERSION,
            entries,
        };
        let serialized = serde_json::to_vec_pretty(&file)?;
        atomic_write(&self.path, &serialized)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), AuthError> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert(key.to_string(), value.to_string());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), AuthError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageFile {
    version: u32,
    entries: BTreeMap<String, String>,
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        AuthError::Storage(format!("Storage path {} has no file name", path.display()))
    })?;

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_name = format!(
        ".{}.tmp-{}-{nonce}",
        file_name.to_string_lossy(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}
