//! The [`RequestCache`] handle.
//!
//! Values are serialized with `serde_json` before they reach a backend, so both
//! backends hold detached byte snapshots and a reader can never observe a value that
//! is still being mutated by its writer.

use crate::builder::RequestCacheBuilder;
use crate::error::{CacheError, CacheErrorExt};
use crate::file::FileBackend;
use crate::key::CacheKey;
use crate::maintenance::GcReport;
use crate::memory::MemoryBackend;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
pub(crate) enum Backend {
    Memory(MemoryBackend),
    File(FileBackend),
}

/// The internal shared state of a [`RequestCache`] instance.
#[derive(Debug)]
pub struct RequestCacheInner {
    pub(crate) backend: Backend,
    pub(crate) ttl: Duration,
    /// Minimum spacing between two sweeps triggered by [`RequestCache::collect_garbage`].
    pub(crate) gc_interval: Duration,
    pub(crate) last_gc: AtomicU64,
}

impl RequestCacheInner {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Memory(_) => "memory",
            Backend::File(_) => "file",
        }
    }
}

/// A thread-safe handle to the request-scoped cache.
///
/// The handle is internally reference-counted (`Arc`) and can be cheaply cloned
/// across threads or tasks. Concurrent `set`/`get` for distinct keys never interfere,
/// and garbage collection can run concurrently with both.
///
/// # Example
///
/// ```rust
/// use apanel_request_cache::{CacheError, RequestCache};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), CacheError> {
///     let cache = RequestCache::builder().ttl(Duration::from_secs(60)).memory().build();
///
///     cache.set("R1", &vec![1, 2, 3]).await?;
///     let hit: Option<Vec<u8>> = cache.get("R1").await?;
///     assert_eq!(hit, Some(vec![1, 2, 3]));
///
///     let miss: Option<Vec<u8>> = cache.get("R2").await?;
///     assert!(miss.is_none());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestCache {
    pub(crate) inner: Arc<RequestCacheInner>,
}

impl Deref for RequestCache {
    type Target = RequestCacheInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl RequestCache {
    #[must_use = "The cache is not usable until you call .build() or .connect()"]
    pub fn builder() -> RequestCacheBuilder {
        RequestCacheBuilder::new()
    }

    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] for keys that are not file-name safe,
    /// [`CacheError::Encoding`] if the value cannot be serialized and
    /// [`CacheError::Io`] if the file backend cannot persist it.
    pub async fn set<K, T>(&self, key: K, value: &T) -> Result<(), CacheError>
    where
        K: TryInto<CacheKey, Error = CacheError>,
        T: Serialize + ?Sized,
    {
        let key = key.try_into()?;
        let payload = serde_json::to_vec(value).context(format!("Serializing entry {key}"))?;

        match &self.backend {
            Backend::Memory(memory) => memory.set(key.as_str(), payload),
            Backend::File(file) => file.set(key.as_str(), &payload).await?,
        }
        debug!(%key, backend = self.backend_name(), "Cache entry stored");
        Ok(())
    }

    /// Reads the entry stored under `key`; expired or absent entries yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] for malformed keys, [`CacheError::Corrupted`]
    /// or [`CacheError::Decompress`] for damaged entries and [`CacheError::Encoding`]
    /// if the entry does not decode into `T`.
    pub async fn get<K, T>(&self, key: K) -> Result<Option<T>, CacheError>
    where
        K: TryInto<CacheKey, Error = CacheError>,
        T: DeserializeOwned,
    {
        let key = key.try_into()?;

        let value = match &self.backend {
            Backend::Memory(memory) => memory
                .get(key.as_str())
                .map(|payload| serde_json::from_slice(&payload))
                .transpose(),
            Backend::File(file) => file
                .get(key.as_str())
                .await?
                .map(|payload| serde_json::from_slice(&payload))
                .transpose(),
        };

        value.context(format!("Decoding entry {key}"))
    }

    /// Removes the entry stored under `key`, reporting whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] for malformed keys and [`CacheError::Io`] if
    /// the file backend cannot delete the entry.
    pub async fn remove<K>(&self, key: K) -> Result<bool, CacheError>
    where
        K: TryInto<CacheKey, Error = CacheError>,
    {
        let key = key.try_into()?;
        match &self.backend {
            Backend::Memory(memory) => Ok(memory.remove(key.as_str())),
            Backend::File(file) => file.remove(key.as_str()).await,
        }
    }

    /// Sweeps expired entries, at most once per configured interval.
    ///
    /// Intended to be called inline after each write. Returns `None` when the sweep
    /// was skipped because another one ran recently.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Join`] if the blocking sweep task panicked.
    pub async fn collect_garbage(&self) -> Result<Option<GcReport>, CacheError> {
        let now = crate::file::unix_now();
        let last = self.last_gc.load(Ordering::Acquire);
        if now.saturating_sub(last) < self.gc_interval.as_secs() {
            return Ok(None);
        }
        // Exactly one concurrent caller wins the slot.
        if self.last_gc.compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Ok(None);
        }
        self.purge_expired().await.map(Some)
    }

    /// Sweeps expired entries unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Join`] if the blocking sweep task panicked.
    pub async fn purge_expired(&self) -> Result<GcReport, CacheError> {
        match &self.backend {
            Backend::Memory(memory) => {
                Ok(GcReport { remaining: memory.collect_garbage(), ..GcReport::default() })
            },
            Backend::File(file) => file.collect_garbage().await,
        }
    }

    /// Physical location of an entry in the file backend (diagnostics only).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] for malformed keys.
    pub fn entry_path<K>(&self, key: K) -> Result<Option<std::path::PathBuf>, CacheError>
    where
        K: TryInto<CacheKey, Error = CacheError>,
    {
        let key = key.try_into()?;
        Ok(match &self.backend {
            Backend::Memory(_) => None,
            Backend::File(file) => Some(file.entry_path(key.as_str())),
        })
    }

    /// Root directory of the file backend.
    #[must_use]
    pub fn root(&self) -> Option<&std::path::Path> {
        match &self.backend {
            Backend::Memory(_) => None,
            Backend::File(file) => Some(file.root()),
        }
    }
}
