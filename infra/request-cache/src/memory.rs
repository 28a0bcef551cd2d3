use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// In-process backend; entries expire through moka's time-to-live policy.
#[derive(Debug, Clone)]
pub(crate) struct MemoryBackend {
    entries: Cache<String, Arc<[u8]>>,
}

impl MemoryBackend {
    pub(crate) fn new(ttl: Duration, capacity: u64) -> Self {
        let entries = Cache::builder().max_capacity(capacity).time_to_live(ttl).build();
        Self { entries }
    }

    pub(crate) fn set(&self, key: &str, payload: Vec<u8>) {
        self.entries.insert(key.to_owned(), Arc::from(payload));
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        self.entries.get(key)
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Applies pending evictions and reports how many entries remain.
    pub(crate) fn collect_garbage(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}
