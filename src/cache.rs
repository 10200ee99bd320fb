//! Device-local key/value storage and the typed panel cache built on it.
//!
//! The store is passed in explicitly so tests and independent service
//! instances never share ambient state. Entries are JSON strings under fixed
//! keys with no schema version; anything that fails to decode is dropped and
//! treated as a miss.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::model::Panel;

/// Key under which the panel list is persisted.
pub const PANELS_KEY: &str = "solarPanels";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache i/o on `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("cache entry `{key}` is not valid JSON for its type: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value storage scoped to one device or session.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Process-lifetime store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Store that keeps one `<key>.json` file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_err(key: &str) -> impl FnOnce(io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    /// Writes through a temp file and renames it over the entry, so readers
    /// see either the old value or the new one.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(io_err(key))?;
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value).map_err(io_err(key))?;
        fs::rename(&temp_path, &path).map_err(io_err(key))
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(key)(e)),
        }
    }
}

/// Outcome of rewriting one panel's maintenance date in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceUpdate {
    /// No panel list is cached; nothing was written.
    NoCache,
    /// The matching panel was rewritten.
    Updated,
    /// A panel list is cached but no panel has that id; nothing was written.
    UnknownPanel,
}

/// Typed view of the cached panel list.
///
/// Storage errors are logged and degrade to a miss; they never reach the
/// caller of the access layer.
#[derive(Clone)]
pub struct PanelCache {
    store: Arc<dyn KeyValueStore>,
    // serializes read-modify-write of the panel entry
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for PanelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelCache").finish_non_exhaustive()
    }
}

impl PanelCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the cached panels, or `None` on a miss.
    ///
    /// An entry that no longer decodes is removed so the next fetch replaces it.
    pub fn load(&self) -> Option<Vec<Panel>> {
        match self.try_load() {
            Ok(panels) => panels,
            Err(e @ CacheError::Json { .. }) => {
                warn!(error = %e, "discarding stale panel cache entry");
                if let Err(e) = self.store.remove(PANELS_KEY) {
                    warn!(error = %e, "failed to remove stale panel cache entry");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "panel cache read failed");
                None
            }
        }
    }

    fn try_load(&self) -> Result<Option<Vec<Panel>>, CacheError> {
        let Some(raw) = self.store.get(PANELS_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| CacheError::Json {
                key: PANELS_KEY.to_string(),
                source,
            })
    }

    /// Replaces the cached panel list.
    pub fn store(&self, panels: &[Panel]) {
        let _guard = self.write_lock.lock();
        self.write(panels);
    }

    fn write(&self, panels: &[Panel]) {
        let result = serde_json::to_string(panels)
            .map_err(|source| CacheError::Json {
                key: PANELS_KEY.to_string(),
                source,
            })
            .and_then(|json| self.store.set(PANELS_KEY, &json));
        match result {
            Ok(()) => debug!(count = panels.len(), "panel cache updated"),
            Err(e) => warn!(error = %e, "panel cache write failed"),
        }
    }

    /// Sets `next_maintenance` on the cached panel with `panel_id`, leaving
    /// every other field and every other panel untouched.
    pub fn update_maintenance(&self, panel_id: &str, date: &str) -> MaintenanceUpdate {
        let _guard = self.write_lock.lock();
        let Some(panels) = self.load() else {
            return MaintenanceUpdate::NoCache;
        };
        if !panels.iter().any(|p| p.id == panel_id) {
            return MaintenanceUpdate::UnknownPanel;
        }
        let updated: Vec<Panel> = panels
            .iter()
            .map(|p| {
                if p.id == panel_id {
                    p.with_next_maintenance(date)
                } else {
                    p.clone()
                }
            })
            .collect();
        self.write(&updated);
        MaintenanceUpdate::Updated
    }

    /// Drops the whole cached panel list.
    pub fn invalidate(&self) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.store.remove(PANELS_KEY) {
            warn!(error = %e, "panel cache invalidation failed");
        }
    }
}
