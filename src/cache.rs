use crate::post::{Post, Snapshot};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Storage key for the serialized post batch.
pub const CONTENT_KEY: &str = "wpcTweets";
/// Storage key for the retrieval timestamp.
pub const TIME_KEY: &str = "wpcTweetsTime";

/// Minimal persistent key-value surface. Implementations never fail:
/// a `get` miss and an unavailable backend both come back as `None`,
/// and `set` swallows (and logs) write problems.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }
}

/// Wraps a key-value store to save/load the last-known-good snapshot.
///
/// Content and timestamp live under two independent keys; both must be
/// present and well-formed for `load` to produce a snapshot. Partial
/// presence is an ordinary cache miss.
pub struct CacheGateway {
    store: Box<dyn KeyValueStore>,
}

impl CacheGateway {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a snapshot. Unconditional overwrite; no merge with what
    /// was there.
    pub fn save(&self, snapshot: &Snapshot) {
        let serialized = match serde_json::to_string(&snapshot.posts) {
            Ok(s) => s,
            Err(err) => {
                warn!(%err, "could not serialize snapshot; cache left unchanged");
                return;
            }
        };
        self.store.set(CONTENT_KEY, &serialized);
        self.store.set(TIME_KEY, &snapshot.retrieved_at.to_string());
    }

    /// Load the last snapshot, or `None` when either key is missing or
    /// holds something unreadable.
    pub fn load(&self) -> Option<Snapshot> {
        let content = self.store.get(CONTENT_KEY)?;
        let time = self.store.get(TIME_KEY)?;

        let posts: Vec<Post> = match serde_json::from_str(&content) {
            Ok(posts) => posts,
            Err(err) => {
                warn!(%err, "cached content is unreadable; treating as miss");
                return None;
            }
        };
        let retrieved_at = match time.parse::<i64>() {
            Ok(t) => t,
            Err(err) => {
                warn!(%err, "cached timestamp is unreadable; treating as miss");
                return None;
            }
        };

        Some(Snapshot {
            posts,
            retrieved_at,
        })
    }
}

/// In-memory store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

/// File-backed store: one JSON object of key -> value at a fixed path.
///
/// Read and write errors degrade to cache misses and logged no-ops; the
/// pipeline treats storage as best-effort.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_map(&self) -> HashMap<String, String> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());

        let serialized = match serde_json::to_string(&map) {
            Ok(s) => s,
            Err(err) => {
                warn!(%err, "could not serialize store contents");
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(%err, path = %self.path.display(), "could not create store directory");
                return;
            }
        }
        if let Err(err) = std::fs::write(&self.path, serialized) {
            warn!(%err, path = %self.path.display(), "could not write store file");
        }
    }
}
