use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use tracing::debug;

use crate::{entry::CachedEntry, freshness::check_not_modified};

/// Concurrent URL -> entry map plus the `<N>.cache` file counter.
///
/// Lookups and stores are atomic per key; nothing is locked while an entry is
/// being revalidated against its origin. Entries are replaced wholesale and
/// never evicted.
#[derive(Debug)]
pub struct CacheStore {
    entries: DashMap<String, Arc<CachedEntry>>,
    file_counter: AtomicU64,
    dir: PathBuf,
    revalidate_timeout: Duration,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>, revalidate_timeout: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            file_counter: AtomicU64::new(0),
            dir: dir.into(),
            revalidate_timeout,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn lookup(&self, url: &str) -> Option<Arc<CachedEntry>> {
        self.entries.get(url).map(|e| Arc::clone(e.value()))
    }

    /// Insert or replace the entry for `entry.url` (last writer wins).
    pub fn store(&self, entry: CachedEntry) {
        debug!(
            target: "hush::cache",
            url = %entry.url,
            is_text = entry.is_text,
            path = %entry.storage_path.display(),
            "Storing cache entry"
        );
        self.entries.insert(entry.url.clone(), Arc::new(entry));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A fresh, never reused `<N>.cache` path inside the cache directory.
    pub fn next_storage_path(&self) -> PathBuf {
        let n = self.file_counter.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!("{n}.cache"))
    }

    /// Ask the origin whether `entry` is still current.
    ///
    /// Fresh only on a `304 Not Modified`; every failure counts as stale.
    pub async fn is_fresh(&self, entry: &CachedEntry) -> bool {
        match check_not_modified(&entry.url, &entry.last_modified, self.revalidate_timeout).await {
            Ok(fresh) => {
                debug!(target: "hush::cache", url = %entry.url, fresh, "Revalidated cache entry");
                fresh
            }
            Err(e) => {
                debug!(
                    target: "hush::cache",
                    url = %entry.url,
                    error = %e,
                    "Revalidation failed; treating entry as stale"
                );
                false
            }
        }
    }
}
