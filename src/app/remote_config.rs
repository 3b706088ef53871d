// AppStart - app/remote_config.rs
//
// Remote feature flags. `initialize` must return immediately: defaults are
// installed synchronously and the fetch of overrides runs on a background
// thread. Readers always see a complete snapshot (defaults, or defaults
// merged with the fetched overrides).

use crate::util::error::AppStartError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;

/// Feature-flag/config value source initialised during bootstrap.
pub trait RemoteConfig: Send + Sync {
    /// Start initialisation without waiting for remote values.
    fn initialize(&self) -> Result<(), AppStartError>;
}

/// Remote config whose "remote" side is a JSON object on disk, typically
/// refreshed by a separate sync process.
#[derive(Debug)]
pub struct FileRemoteConfig {
    source: PathBuf,
    defaults: Map<String, Value>,
    values: Arc<RwLock<Map<String, Value>>>,
    fetch: Mutex<Option<JoinHandle<()>>>,
}

impl FileRemoteConfig {
    pub fn new(source: impl Into<PathBuf>, defaults: Map<String, Value>) -> Self {
        Self {
            source: source.into(),
            defaults,
            values: Arc::new(RwLock::new(Map::new())),
            fetch: Mutex::new(None),
        }
    }

    /// Block until a fetch started by `initialize` has finished.
    /// Returns immediately if none is running.
    pub fn wait_for_fetch(&self) {
        let handle = self
            .fetch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!("Remote config fetch thread panicked");
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_i64()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl RemoteConfig for FileRemoteConfig {
    fn initialize(&self) -> Result<(), AppStartError> {
        *self
            .values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = self.defaults.clone();

        let source = self.source.clone();
        let defaults = self.defaults.clone();
        let values = Arc::clone(&self.values);
        let handle = std::thread::Builder::new()
            .name("remote-config-fetch".to_string())
            .spawn(move || {
                if let Some(overrides) = fetch_overrides(&source) {
                    let mut merged = defaults;
                    let count = overrides.len();
                    merged.extend(overrides);
                    *values
                        .write()
                        .unwrap_or_else(|poisoned| poisoned.into_inner()) = merged;
                    tracing::info!(path = %source.display(), overrides = count, "Remote config activated");
                }
            })
            .map_err(|e| AppStartError::collaborator("remote config", e.to_string()))?;

        *self
            .fetch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handle);
        tracing::debug!(defaults = self.defaults.len(), "Remote config defaults installed; fetch started");
        Ok(())
    }
}

/// Read the override object. Missing or malformed files leave the defaults
/// in place.
fn fetch_overrides(path: &Path) -> Option<Map<String, Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read remote config");
            }
            return None;
        }
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Remote config is not a JSON object; keeping defaults");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Malformed remote config; keeping defaults");
            None
        }
    }
}
