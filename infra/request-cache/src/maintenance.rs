use crate::error::CacheError;
use crate::file::{ENTRY_EXTENSION, HEADER_LEN, TMP_MARKER, decode_record};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

const TMP_THRESHOLD: Duration = Duration::from_secs(300);

/// Outcome of one garbage-collection sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcReport {
    /// Expired entries and stale temporary files deleted.
    pub removed: usize,
    /// Files that could not be inspected or deleted.
    pub failed: usize,
    /// Entries still alive after the sweep.
    pub remaining: u64,
}

pub(crate) async fn collect_expired(root: &Path, now: u64) -> Result<GcReport, CacheError> {
    let root = root.to_path_buf();
    let report = tokio::task::spawn_blocking(move || sweep(&root, now, SystemTime::now()))
        .await
        .map_err(|source| CacheError::Join { source, context: Some("Garbage collection".into()) })?;

    if report.removed > 0 || report.failed > 0 {
        info!(removed = report.removed, failed = report.failed, "Cache garbage collected");
    }
    Ok(report)
}

/// Removes temporary files left behind by interrupted writes.
pub(crate) async fn purge_tmp(root: PathBuf) {
    let result = tokio::task::spawn_blocking(move || {
        let mut report = GcReport::default();
        let now = SystemTime::now();
        for entry in WalkDir::new(&root).into_iter().flatten() {
            if is_tmp(&entry) && is_stale(&entry, now) {
                remove(entry.path(), &mut report);
            }
        }
        report
    })
    .await;

    match result {
        Ok(report) if report.removed > 0 || report.failed > 0 => {
            info!(removed = report.removed, failed = report.failed, "Cleaned up temporary files");
        },
        Err(e) => warn!(error = %e, "Temp file cleanup task panicked"),
        _ => {},
    }
}

fn sweep(root: &Path, now: u64, wall_clock: SystemTime) -> GcReport {
    let mut report = GcReport::default();

    WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .flatten()
        .filter(|e| e.path() != root)
        .for_each(|entry| {
            let path = entry.path();

            if is_tmp(&entry) {
                if is_stale(&entry, wall_clock) {
                    remove(path, &mut report);
                }
            } else if is_entry(&entry) {
                match read_expiry(path) {
                    Some(expires_at) if expires_at > now => report.remaining += 1,
                    Some(_) | None => remove(path, &mut report),
                }
            } else if entry.file_type().is_dir() {
                // Fails while the shard still holds entries.
                let _ = std::fs::remove_dir(path);
            }
        });

    report
}

fn remove(path: &Path, report: &mut GcReport) {
    match std::fs::remove_file(path) {
        Ok(()) => report.removed += 1,
        // Lost a race with a concurrent sweep or reader.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove cache file");
            report.failed += 1;
        },
    }
}

fn read_expiry(path: &Path) -> Option<u64> {
    let mut header = [0_u8; HEADER_LEN];
    let mut file = std::fs::File::open(path).ok()?;
    file.read_exact(&mut header).ok()?;
    decode_record(&header).map(|(expires_at, _, _)| expires_at)
}

fn is_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.path().extension().and_then(|ext| ext.to_str()) == Some(ENTRY_EXTENSION)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > TMP_THRESHOLD)
}
