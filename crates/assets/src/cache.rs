use std::collections::HashMap;

#[derive(Debug)]
struct CachedBytes {
    data: Vec<u8>,
    last_used: u64,
}

/// Least-recently-used byte cache with a total size budget.
#[derive(Debug)]
pub(crate) struct ByteCache {
    entries: HashMap<String, CachedBytes>,
    usage_counter: u64,
    current_bytes: usize,
    max_bytes: usize,
}

impl ByteCache {
    pub(crate) fn new(max_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            usage_counter: 0,
            current_bytes: 0,
            max_bytes,
        }
    }

    pub(crate) fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        self.usage_counter = self.usage_counter.wrapping_add(1);
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = self.usage_counter;
            entry.data.clone()
        })
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn current_bytes(&self) -> usize {
        self.current_bytes
    }

    /// Returns false when the blob alone exceeds the budget and was not kept.
    pub(crate) fn insert(&mut self, key: String, data: Vec<u8>) -> bool {
        let bytes = data.len();
        if bytes > self.max_bytes {
            return false;
        }

        self.usage_counter = self.usage_counter.wrapping_add(1);

        if let Some(old) = self.entries.remove(&key) {
            self.current_bytes = self.current_bytes.saturating_sub(old.data.len());
        }

        while self.current_bytes + bytes > self.max_bytes {
            let Some((evict_key, evict_bytes)) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, entry)| (k.clone(), entry.data.len()))
            else {
                break;
            };
            self.entries.remove(&evict_key);
            self.current_bytes = self.current_bytes.saturating_sub(evict_bytes);
        }

        self.entries.insert(
            key,
            CachedBytes {
                data,
                last_used: self.usage_counter,
            },
        );
        self.current_bytes = self.current_bytes.saturating_add(bytes);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used_first() {
        let mut cache = ByteCache::new(8);
        cache.insert("a".into(), vec![0; 4]);
        cache.insert("b".into(), vec![0; 4]);
        cache.get("a");
        cache.insert("c".into(), vec![0; 4]);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert_eq!(cache.current_bytes(), 8);
    }

    #[test]
    fn oversized_blobs_are_not_kept() {
        let mut cache = ByteCache::new(2);
        assert!(!cache.insert("big".into(), vec![0; 3]));
        assert_eq!(cache.len(), 0);
    }
}
