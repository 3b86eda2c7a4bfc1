//! Cookie persistence - save and load jar state through a key-value store.
//!
//! A jar is stored as two string entries:
//! - `<host>_cookie_<account>`: the composite `Cookie` header
//! - `<host>_cookie_<account>_paths`: the scope registry as a JSON object

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// String key-value storage that outlives the process.
///
/// Implementations must be thread-safe; a session only reads once (before
/// its first request) and writes after each automatic login.
pub trait PropertyStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, NetError>;

    fn set(&self, key: &str, value: &str) -> Result<(), NetError>;
}

impl<S: PropertyStore + ?Sized> PropertyStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, NetError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NetError> {
        (**self).set(key, value)
    }
}

/// Process-local store. Useful for tests and for sharing one login between
/// sessions created one after another.
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    entries: DashMap<String, String>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn get(&self, key: &str) -> Result<Option<String>, NetError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NetError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// Every `set` rewrites the whole file. Concurrent writers from different
/// processes may overwrite each other.
#[derive(Debug)]
pub struct JsonFilePropertyStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePropertyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, NetError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = fs::read_to_string(&self.path).store_context(&self.path)?;
        if json.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&json).map_err(|e| {
            NetError::store_error(format!("{}: {}", self.path.display(), e))
        })
    }
}

impl PropertyStore for JsonFilePropertyStore {
    fn get(&self, key: &str) -> Result<Option<String>, NetError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), NetError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| NetError::store_error("property store lock poisoned"))?;

        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());

        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json).store_context(&self.path)
    }
}

/// Key namespace for one host/account pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    cookie: String,
    paths: String,
}

impl StorageKeys {
    /// `account` defaults to the empty string, giving `<host>_cookie_`.
    pub fn new(host: &str, account: Option<&str>) -> Self {
        let cookie = format!("{}_cookie_{}", host, account.unwrap_or(""));
        let paths = format!("{}_paths", cookie);
        Self { cookie, paths }
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn paths(&self) -> &str {
        &self.paths
    }
}

/// Write the jar's header and scope registry under `keys`.
pub fn save_jar(
    store: &dyn PropertyStore,
    keys: &StorageKeys,
    jar: &CookieJar,
) -> Result<(), NetError> {
    store.set(keys.cookie(), jar.header())?;
    store.set(keys.paths(), &jar.scopes_json()?)
}

/// Read a jar previously written by [`save_jar`]. Missing keys yield an empty jar.
pub fn load_jar(store: &dyn PropertyStore, keys: &StorageKeys) -> Result<CookieJar, NetError> {
    let mut jar = CookieJar::new();
    let header = store.get(keys.cookie())?;
    let scopes = store.get(keys.paths())?;
    jar.hydrate(header, scopes.as_deref())?;
    Ok(jar)
}
