use crate::engine::{Backend, RequestCache, RequestCacheInner};
use crate::error::{CacheError, CacheErrorExt};
use crate::file::{Compression, FileBackend};
use crate::maintenance;
use crate::memory::MemoryBackend;
use apanel_domain::config::{CacheBackend, CacheConfig};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
struct CacheSettings {
    ttl: Duration,
    capacity: u64,
    gc_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            capacity: 10_000,
            gc_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Default)]
pub struct NoBackend;
#[derive(Debug)]
pub struct WithMemory;
#[derive(Debug)]
pub struct WithFile {
    root: PathBuf,
    compression: Compression,
    create: bool,
}

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoBackend {}
impl Sealed for WithMemory {}
impl Sealed for WithFile {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct RequestCacheBuilder<S: Sealed = NoBackend> {
    state: S,
    settings: CacheSettings,
}

#[allow(private_bounds)]
impl<S: Sealed> RequestCacheBuilder<S> {
    #[must_use = "Sets how long captured entries stay readable"]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.settings.ttl = ttl;
        self
    }

    #[must_use = "Sets the maximum number of entries held by the memory backend"]
    pub const fn capacity(mut self, capacity: u64) -> Self {
        self.settings.capacity = capacity;
        self
    }

    #[must_use = "Sets the minimum spacing between inline garbage collection sweeps"]
    pub const fn gc_interval(mut self, interval: Duration) -> Self {
        self.settings.gc_interval = interval;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> RequestCacheBuilder<N> {
        RequestCacheBuilder { state, settings: self.settings }
    }

    fn finish(settings: CacheSettings, backend: Backend) -> RequestCache {
        RequestCache {
            inner: Arc::new(RequestCacheInner {
                backend,
                ttl: settings.ttl,
                gc_interval: settings.gc_interval,
                last_gc: AtomicU64::new(0),
            }),
        }
    }
}

impl RequestCacheBuilder<NoBackend> {
    #[must_use = "Creates a new cache builder with default settings"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Selects the in-process backend"]
    pub fn memory(self) -> RequestCacheBuilder<WithMemory> {
        self.transition(WithMemory)
    }

    #[must_use = "Selects the file backend rooted at the given directory"]
    pub fn root(self, path: impl Into<PathBuf>) -> RequestCacheBuilder<WithFile> {
        self.transition(WithFile { root: path.into(), compression: Compression::None, create: true })
    }

    /// Builds the backend described by the `[cache]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file backend root cannot be prepared.
    pub async fn from_config(self, config: &CacheConfig) -> Result<RequestCache, CacheError> {
        let builder =
            self.ttl(Duration::from_secs(config.ttl_seconds)).capacity(config.capacity);
        match config.backend {
            CacheBackend::Memory => Ok(builder.memory().build()),
            CacheBackend::File => {
                let compression =
                    if config.compression { Compression::Lz4 } else { Compression::None };
                builder.root(&config.root).compression(compression).connect().await
            },
        }
    }
}

impl RequestCacheBuilder<WithMemory> {
    #[must_use]
    pub fn build(self) -> RequestCache {
        let memory = MemoryBackend::new(self.settings.ttl, self.settings.capacity);
        info!(ttl = self.settings.ttl.as_secs(), "Request cache ready (memory)");
        Self::finish(self.settings, Backend::Memory(memory))
    }
}

impl RequestCacheBuilder<WithFile> {
    #[must_use = "Sets compression for stored entries"]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.state.compression = compression;
        self
    }

    #[must_use = "Sets whether the root directory should be created if it does not exist"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.state.create = enable;
        self
    }

    /// Prepares the root directory and returns the cache handle.
    ///
    /// Temporary files orphaned by interrupted writes are removed on the way; that
    /// cleanup is best effort and only logged when it fails.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the root does not exist and `create` is false,
    /// or if it cannot be created or resolved.
    pub async fn connect(self) -> Result<RequestCache, CacheError> {
        let WithFile { root, compression, create } = self.state;

        if create {
            fs::create_dir_all(&root)
                .await
                .context(format!("Failed to bootstrap cache root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(&root)
            .await
            .context(format!("Failed to resolve cache root: {}", root.display()))?;

        maintenance::purge_tmp(canonical.clone()).await;
        info!(path = %canonical.display(), ttl = self.settings.ttl.as_secs(), "Request cache ready (file)");

        let backend = FileBackend::new(canonical, self.settings.ttl, compression);
        Ok(Self::finish(self.settings, Backend::File(backend)))
    }
}
