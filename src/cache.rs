//! Process-wide TTL cache for computed endpoint results.
//!
//! Pure TTL expiry: entries live for a fixed duration from insertion, reads
//! do not refresh them, and refreshing a key replaces the whole entry.
//! There is no LRU policy and no bound on entry count.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Default entry lifetime: 1 hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Look up a key. Expired entries are dropped on access and report a miss.
    pub fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().expect("cache lock poisoned");
            match entries.get(key) {
                Some(e) if !e.is_expired() => return Some(e.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: upgrade to a write lock and evict.
        let mut entries = self.entries.write().expect("cache lock poisoned");
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
        }
        None
    }

    /// Insert with the default TTL, replacing any previous entry.
    pub fn set(&self, key: &str, value: Value) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key.to_string(), entry);
    }

    /// Remove everything; returns how many live entries were flushed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let count = entries.values().filter(|e| !e.is_expired()).count();
        entries.clear();
        count
    }

    /// Keys of all non-expired entries.
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().expect("cache lock poisoned");
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, e)| !e.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
