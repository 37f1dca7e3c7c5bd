//! Durable storage of the completion record.
//!
//! The record lives as one JSON blob under a fixed key in a [`KeyValueMedium`].
//! [`FileMedium`] keeps each key in its own file and replaces it atomically;
//! [`MemoryMedium`] keeps blobs in process and can be told to fail reads or
//! writes.

use crate::errors::StoreError;
use crate::models::{CompletionRecord, DateKey, HourKey};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_STORAGE_KEY: &str = "squat-tracker-data";

/// A durable byte store addressed by string keys.
#[async_trait]
pub trait KeyValueMedium: Send + Sync {
    /// Returns `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>>;

    /// Replaces the value under `key` as a whole.
    async fn set(&self, key: &str, bytes: &[u8]) -> std::io::Result<()>;
}

/// Stores each key as `{dir}/{key}.json`.
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueMedium for FileMedium {
    async fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn set(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await?;

        // Temp file sits next to the target so the rename stays on one filesystem.
        let tmp_path = self.dir.join(format!(".{key}.tmp"));
        let result = write_then_rename(&tmp_path, &self.path_for(key), bytes).await;
        if result.is_err() {
            if let Err(err) = fs::remove_file(&tmp_path).await {
                if err.kind() != ErrorKind::NotFound {
                    warn!(path = %tmp_path.display(), "failed to remove temp file: {err}");
                }
            }
        }
        result
    }
}

async fn write_then_rename(tmp_path: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(tmp_path, target).await
}

/// In-process medium. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    reject_reads: Arc<AtomicBool>,
    reject_writes: Arc<AtomicBool>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `get` fail until turned off again.
    pub fn reject_reads(&self, reject: bool) {
        self.reject_reads.store(reject, Ordering::SeqCst);
    }

    /// Makes every following `set` fail until turned off again.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub async fn insert(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.blobs.lock().await.insert(key.to_string(), bytes.into());
    }

    pub async fn stored(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueMedium for MemoryMedium {
    async fn get(&self, key: &str) -> std::io::Result<Option<Vec<u8>>> {
        if self.reject_reads.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                ErrorKind::PermissionDenied,
                "memory medium is rejecting reads",
            ));
        }
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, bytes: &[u8]) -> std::io::Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                ErrorKind::StorageFull,
                "memory medium is rejecting writes",
            ));
        }
        self.blobs.lock().await.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Loads and saves the whole [`CompletionRecord`] under one key.
#[derive(Debug, Clone)]
pub struct PersistentStore<M> {
    medium: M,
    key: String,
}

impl<M: KeyValueMedium> PersistentStore<M> {
    pub fn new(medium: M, key: impl Into<String>) -> Self {
        Self {
            medium,
            key: key.into(),
        }
    }

    /// Reads the stored record. A missing blob is an empty record.
    pub async fn load(&self) -> Result<CompletionRecord, StoreError> {
        let bytes = self
            .medium
            .get(&self.key)
            .await
            .map_err(|source| StoreError::StorageRead {
                key: self.key.clone(),
                source,
            })?;

        match bytes {
            Some(bytes) => decode_record(&self.key, &bytes),
            None => {
                debug!(key = %self.key, "no stored record, starting empty");
                Ok(CompletionRecord::default())
            }
        }
    }

    /// Writes the full record, replacing whatever was stored before.
    pub async fn save(&self, record: &CompletionRecord) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(record)?;
        self.medium
            .set(&self.key, &payload)
            .await
            .map_err(|source| StoreError::StorageWrite {
                key: self.key.clone(),
                source,
            })
    }
}

/// Parses a stored blob, skipping entries whose keys or values do not fit
/// the layout. Only a blob that is not a JSON object at all is corrupt.
fn decode_record(key: &str, bytes: &[u8]) -> Result<CompletionRecord, StoreError> {
    let corrupt = |reason: String| StoreError::CorruptData {
        key: key.to_string(),
        reason,
    };

    let value: Value = serde_json::from_slice(bytes).map_err(|err| corrupt(err.to_string()))?;
    let Value::Object(days) = value else {
        return Err(corrupt("top-level value is not an object".to_string()));
    };

    let mut record = CompletionRecord::default();
    for (date_raw, hours) in days {
        let Ok(date) = date_raw.parse::<DateKey>() else {
            warn!(key, entry = %date_raw, "ignoring unknown date entry");
            continue;
        };
        let Value::Object(hours) = hours else {
            warn!(key, %date, "ignoring non-object day entry");
            continue;
        };
        for (hour_raw, flag) in hours {
            match (hour_raw.parse::<HourKey>(), flag) {
                (Ok(hour), Value::Bool(done)) => record.set(date, hour, done),
                _ => warn!(key, %date, entry = %hour_raw, "ignoring malformed hour entry"),
            }
        }
    }

    Ok(record)
}
