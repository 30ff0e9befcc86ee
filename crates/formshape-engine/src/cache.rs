//! Session Cache Capability
//!
//! A best-effort client-local store keyed by semantic field label (not by
//! resolved field id), consulted to recover a last-known-good value across
//! form sessions. Injected explicitly so tests can substitute a fake;
//! never authoritative — schema/server defaults always win.

use parking_lot::RwLock;
use std::collections::BTreeMap;

pub trait SessionCache: Send + Sync {
    fn get(&self, label: &str) -> Option<String>;
    fn put(&self, label: &str, value: &str);
}

/// In-memory cache backing.
#[derive(Debug, Default)]
pub struct MemorySessionCache {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionCache for MemorySessionCache {
    fn get(&self, label: &str) -> Option<String> {
        self.entries.read().get(label).cloned()
    }

    fn put(&self, label: &str, value: &str) {
        self.entries.write().insert(label.to_string(), value.to_string());
    }
}

/// The absent-cache capability: reads nothing, stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl SessionCache for NoCache {
    fn get(&self, _label: &str) -> Option<String> {
        None
    }

    fn put(&self, _label: &str, _value: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cache_round_trips() {
        let cache = MemorySessionCache::new();
        assert_eq!(cache.get("account"), None);
        cache.put("account", "https://x/acct-1");
        assert_eq!(cache.get("account"), Some("https://x/acct-1".to_string()));
    }
}
