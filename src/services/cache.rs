use dashmap::DashMap;

/// A thread-safe keyed blob store.
///
/// Entries never expire; staleness is handled by callers removing keys.
/// Writes to the same key are last-writer-wins.
pub struct Cache<V> {
    data: DashMap<String, V>,
}

impl<V: Clone> Cache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Get a value from the cache.
    pub fn get(&self, key: &str) -> Option<V> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Store a value, replacing any previous one.
    pub fn set(&self, key: String, value: V) {
        self.data.insert(key, value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the cache.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.data.remove(key).map(|(_, value)| value)
    }

    /// Remove every key starting with `prefix`, returning how many went.
    pub fn remove_prefix(&self, prefix: &str) -> usize {
        let before = self.data.len();
        self.data.retain(|key, _| !key.starts_with(prefix));
        before.saturating_sub(self.data.len())
    }

    /// Clear all entries, returning how many were removed.
    pub fn clear(&self) -> usize {
        let count = self.data.len();
        self.data.clear();
        count
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}
