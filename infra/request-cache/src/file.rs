//! Sharded on-disk backend.
//!
//! Every entry is a single file `<root>/<ab>/<cd>/<key>.entry` laid out as
//! `[expires_at: u64 BE][flags: u8][payload]`. Writes go through a unique temporary
//! file followed by `fsync` and `rename`, so readers never observe partial entries.

use crate::error::{CacheError, CacheErrorExt};
use crate::maintenance::{self, GcReport};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub(crate) const ENTRY_EXTENSION: &str = "entry";
pub(crate) const TMP_MARKER: &str = ".apaneltmp.";
pub(crate) const HEADER_LEN: usize = 9;

const FLAG_LZ4: u8 = 0b0000_0001;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    const fn flags(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Lz4 => FLAG_LZ4,
        }
    }

    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FileBackend {
    root: PathBuf,
    ttl: Duration,
    compression: Compression,
    tmp_counter: AtomicU64,
}

impl FileBackend {
    pub(crate) const fn new(root: PathBuf, ttl: Duration, compression: Compression) -> Self {
        Self { root, ttl, compression, tmp_counter: AtomicU64::new(1) }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn entry_path(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        let chars: Vec<char> = key.chars().collect();
        if chars.len() >= 4 {
            path.push(chars[0..2].iter().collect::<String>());
            path.push(chars[2..4].iter().collect::<String>());
        }
        path.push(format!("{key}.{ENTRY_EXTENSION}"));
        path
    }

    pub(crate) async fn set(&self, key: &str, payload: &[u8]) -> Result<(), CacheError> {
        let target = self.entry_path(key);
        let expires_at = unix_now().saturating_add(self.ttl.as_secs());

        let mut record = Vec::with_capacity(HEADER_LEN + payload.len());
        record.extend_from_slice(&expires_at.to_be_bytes());
        record.push(self.compression.flags());
        record.extend_from_slice(&self.compression.compress(payload));

        let temp = self.unique_tmp_path(&target);
        self.write_temp(&target, &temp, &record).await?;

        if let Err(err) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(CacheError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                        .into(),
                ),
            });
        }

        debug!(path = %target.display(), expires_at, "Cache entry written");
        Ok(())
    }

    /// Creates the shard directories and writes the temporary file.
    ///
    /// Garbage collection may remove an emptied shard directory between the two steps,
    /// so a vanished parent is recreated once.
    async fn write_temp(&self, target: &Path, temp: &Path, record: &[u8]) -> Result<(), CacheError> {
        let parent = target.parent().unwrap_or(&self.root);
        let mut attempts = 0;
        loop {
            attempts += 1;
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create shards for {}", target.display()))?;

            match fs::OpenOptions::new().create_new(true).write(true).open(temp).await {
                Ok(mut file) => {
                    file.write_all(record).await.context("Write failed")?;
                    file.sync_all().await.context("Hardware sync failed")?;
                    return Ok(());
                },
                Err(err) if err.kind() == std::io::ErrorKind::NotFound && attempts < 2 => {},
                Err(err) => {
                    return Err(CacheError::Io {
                        source: err,
                        context: Some(format!("Temp creation failed: {}", temp.display()).into()),
                    });
                },
            }
        }
    }

    pub(crate) async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(key);

        let record = match fs::read(&path).await {
            Ok(record) => record,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(CacheError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        let (expires_at, flags, body) = decode_record(&record).ok_or_else(|| CacheError::Corrupted {
            message: path.display().to_string().into(),
            context: Some("Entry header is truncated".into()),
        })?;

        if expires_at <= unix_now() {
            debug!(path = %path.display(), "Cache entry expired");
            let _ = fs::remove_file(&path).await;
            return Ok(None);
        }

        if flags & FLAG_LZ4 == 0 {
            Ok(Some(body.to_vec()))
        } else {
            lz4_flex::decompress_size_prepended(body)
                .map(Some)
                .context(format!("Lz4 decompression failed: {}", path.display()))
        }
    }

    pub(crate) async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(CacheError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", path.display()).into()),
            }),
        }
    }

    pub(crate) async fn collect_garbage(&self) -> Result<GcReport, CacheError> {
        maintenance::collect_expired(&self.root, unix_now()).await
    }

    fn unique_tmp_path(&self, target: &Path) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("cache");
        target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
    }
}

pub(crate) fn decode_record(record: &[u8]) -> Option<(u64, u8, &[u8])> {
    if record.len() < HEADER_LEN {
        return None;
    }
    let (header, body) = record.split_at(HEADER_LEN);
    let mut expiry = [0_u8; 8];
    expiry.copy_from_slice(&header[..8]);
    Some((u64::from_be_bytes(expiry), header[8], body))
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_secs())
}
