//! File-backed record store: one JSON array per file.
//!
//! Every mutation runs as load, mutate, save while holding a lock dedicated
//! to that file. Two requests against the same file therefore never
//! interleave their read-modify-write cycles, while requests against
//! different files proceed independently.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as SyncMutex, MutexGuard, PoisonError};

use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{Record, StoreError};

type LockMap = HashMap<PathBuf, Arc<Mutex<()>>>;

/// Lock-per-file JSON array store.
///
/// A file's entry lives in the lock map only while some request holds or
/// waits for it.
#[derive(Debug, Default)]
pub struct JsonStore {
    locks: SyncMutex<LockMap>,
}

impl JsonStore {
    /// Store with no files locked yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses `path` without taking its lock.
    pub async fn load(path: &Path) -> Result<Vec<Record>, StoreError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes `records` to `path` pretty-printed with two-space indentation.
    ///
    /// The bytes land in a sibling temp file, which is synced to disk and
    /// then renamed over `path`, so readers see either the old or the new
    /// list.
    pub async fn save(path: &Path, records: &[Record]) -> Result<(), StoreError> {
        let write_err = |source: io::Error| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };

        let bytes = serde_json::to_vec_pretty(records).map_err(|e| write_err(e.into()))?;
        let tmp = temp_path(path);

        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(tmp = %tmp.display(), error = %cleanup, "failed to remove temp file");
                }
            }
            return Err(write_err(e));
        }

        debug!(path = %path.display(), records = records.len(), "saved records");
        Ok(())
    }

    /// Loads `path` while holding its lock.
    pub async fn read(&self, path: &Path) -> Result<Vec<Record>, StoreError> {
        let _lock = self.acquire(path).await;
        Self::load(path).await
    }

    /// Runs one load, mutate, save cycle on `path` and returns the list as
    /// saved.
    ///
    /// When `mutate` fails nothing is written and the file is left untouched.
    pub async fn modify<F>(&self, path: &Path, mutate: F) -> Result<Vec<Record>, StoreError>
    where
        F: FnOnce(&mut Vec<Record>) -> Result<(), StoreError>,
    {
        let _lock = self.acquire(path).await;

        let mut records = Self::load(path).await?;
        mutate(&mut records)?;
        Self::save(path, &records).await?;
        Ok(records)
    }

    async fn acquire(&self, path: &Path) -> FileLock<'_> {
        let lock = Arc::clone(self.lock_map().entry(path.to_path_buf()).or_default());
        let guard = lock.lock_owned().await;
        FileLock {
            store: self,
            path: path.to_path_buf(),
            guard: Some(guard),
        }
    }

    fn lock_map(&self) -> MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops the entry for `path` once nobody else references it.
    fn forget_if_idle(&self, path: &Path) {
        let mut locks = self.lock_map();
        if locks.get(path).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(path);
        }
    }
}

/// Exclusive hold on one file; releases the map entry when dropped.
struct FileLock<'a> {
    store: &'a JsonStore,
    path: PathBuf,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for FileLock<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.store.forget_if_idle(&self.path);
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}
