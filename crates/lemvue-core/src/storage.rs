// ── Session-scoped storage ──
//
// Key/value JSON store that lives for one program run. Scroll offsets
// and the OAuth handshake blob are kept here.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::route::HistoryKey;

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str) -> Option<Value>;
    fn keys(&self) -> Vec<String>;
}

/// Typed read; undecodable values are treated as absent.
pub fn get_json<T: DeserializeOwned>(storage: &dyn SessionStorage, key: &str) -> Option<T> {
    serde_json::from_value(storage.get(key)?).ok()
}

/// Typed write; values that fail to serialize are logged and skipped.
pub fn set_json<T: Serialize>(storage: &dyn SessionStorage, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(v) => storage.set(key, v),
        Err(e) => warn!(key, error = %e, "failed to serialize session value"),
    }
}

/// In-process storage backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: Value) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

// ── Scroll offsets ───────────────────────────────────────────────────

const SCROLL_PREFIX: &str = "scroll:";

/// Scroll offsets keyed by navigation history entry.
#[derive(Clone)]
pub struct ScrollStore {
    storage: Arc<dyn SessionStorage>,
}

impl ScrollStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    fn key(entry: &HistoryKey) -> String {
        format!("{SCROLL_PREFIX}{entry}")
    }

    pub fn save(&self, entry: &HistoryKey, offset: usize) {
        set_json(self.storage.as_ref(), &Self::key(entry), &offset);
    }

    #[cfg(test)]
    pub fn peek(&self, entry: &HistoryKey) -> Option<usize> {
        get_json(self.storage.as_ref(), &Self::key(entry))
    }

    /// Read and delete.
    pub fn take(&self, entry: &HistoryKey) -> Option<usize> {
        let value = self.storage.remove(&Self::key(entry))?;
        serde_json::from_value(value).ok()
    }

    pub fn forget(&self, entry: &HistoryKey) {
        self.storage.remove(&Self::key(entry));
    }

    /// Drop every stored offset.
    pub fn clear(&self) {
        for key in self.storage.keys() {
            if key.starts_with(SCROLL_PREFIX) {
                self.storage.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_reads_once() {
        let store = ScrollStore::new(Arc::new(MemoryStorage::new()));
        let entry = HistoryKey::from("abc");
        store.save(&entry, 42);
        assert_eq!(store.peek(&entry), Some(42));
        assert_eq!(store.take(&entry), Some(42));
        assert_eq!(store.take(&entry), None);
    }

    #[test]
    fn clear_only_touches_scroll_keys() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("oauth_state", Value::Bool(true));
        let store = ScrollStore::new(storage.clone());
        store.save(&HistoryKey::from("a"), 1);
        store.save(&HistoryKey::from("b"), 2);

        store.clear();

        assert_eq!(storage.keys(), vec!["oauth_state".to_owned()]);
    }

    #[test]
    fn garbage_values_read_as_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("scroll:x", Value::String("nope".into()));
        let store = ScrollStore::new(storage);
        assert_eq!(store.peek(&HistoryKey::from("x")), None);
    }
}
