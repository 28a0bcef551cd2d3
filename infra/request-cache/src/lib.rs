//! A short-lived, request-scoped cache.
//!
//! The admin panel captures module data after a page has been rendered and reads it
//! back on the render pass using the request identifier as key. Entries are written
//! once, never updated, and disappear through TTL-based garbage collection.
//!
//! # Backends
//!
//! - **Memory**: a `moka` cache with time-to-live eviction, for single-process hosts.
//! - **File**: sharded files (`<root>/<ab>/<cd>/<key>.entry`) written atomically
//!   (unique temp write + `fsync` + `rename`), optional LZ4 compression, and a
//!   `walkdir` sweep that deletes expired entries and orphaned temporary files.
//!
//! # Examples
//!
//! ```rust
//! use apanel_request_cache::{CacheError, Compression, RequestCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CacheError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     let cache = RequestCache::builder()
//!         .root(tmp.path().join("cache"))
//!         .compression(Compression::Lz4)
//!         .connect()
//!         .await?;
//!
//!     cache.set("abcd1234", &"captured").await?;
//!     let value: Option<String> = cache.get("abcd1234").await?;
//!     assert_eq!(value.as_deref(), Some("captured"));
//!
//!     cache.collect_garbage().await?;
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod file;
mod key;
mod maintenance;
mod memory;

pub use builder::{NoBackend, RequestCacheBuilder, WithFile, WithMemory};
pub use engine::{RequestCache, RequestCacheInner};
pub use error::{CacheError, CacheErrorExt};
pub use file::Compression;
pub use key::CacheKey;
pub use maintenance::GcReport;
