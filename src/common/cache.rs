//! In-memory TTL cache.
//!
//! Good enough for a single-process bot. If this ever scales horizontally,
//! swap it for Redis or similar.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    expires_at: Instant,
    value: V,
}

/// Key-value store with per-entry expiry.
///
/// Expired entries are evicted lazily on `get`; there is no background
/// sweep and no capacity bound. The inner mutex is never held across an
/// await point, so sharing an instance between command handlers is fine.
pub struct TtlCache<K, V> {
    ttl: Duration,
    store: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a key, removing it if its TTL has elapsed.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut store = self.store.lock().unwrap();
        match store.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                store.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: K, value: V) {
        let mut store = self.store.lock().unwrap();
        store.insert(
            key,
            Entry {
                expires_at: Instant::now() + self.ttl,
                value,
            },
        );
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        self.store.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_get_after_set_within_ttl() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set("key", 42);
        assert_eq!(cache.get(&"key"), Some(42));
    }

    #[test]
    fn test_get_missing_key() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&"absent"), None);
    }

    #[test]
    fn test_get_after_expiry_removes_entry() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_millis(10));
        cache.set("key", 42);
        sleep(Duration::from_millis(20));

        assert_eq!(cache.get(&"key"), None);
        // Entry must be gone, not just hidden
        assert!(cache.store.lock().unwrap().is_empty());
    }

    #[test]
    fn test_set_overwrites_existing() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set("key", 1);
        cache.set("key", 2);
        assert_eq!(cache.get(&"key"), Some(2));
    }

    #[test]
    fn test_clear() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn test_composite_key() {
        let cache: TtlCache<(String, String), i64> = TtlCache::new(Duration::from_secs(60));
        cache.set(("stormrage".to_string(), "thrall".to_string()), 480);
        assert_eq!(
            cache.get(&("stormrage".to_string(), "thrall".to_string())),
            Some(480)
        );
        assert_eq!(
            cache.get(&("stormrage".to_string(), "jaina".to_string())),
            None
        );
    }
}
