//! Durable key stores.
//!
//! The ledger hands a store the full record collection on every change; a
//! store never sees partial updates. `JsonFileStore` writes the document to a
//! temp file and renames it over the original so a crash mid-write leaves the
//! previous version intact.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use super::record::{Expiration, KeyRecord};
use crate::error::StoreError;

/// A durable home for the ledger's records.
pub trait KeyStore: Send + Sync {
    /// Read every stored record, in stored order.
    fn load(&self) -> Result<Vec<KeyRecord>, StoreError>;

    /// Replace the stored collection with `records`.
    fn save(&self, records: &[KeyRecord]) -> Result<(), StoreError>;
}

/// On-disk document shape.
#[derive(Serialize)]
struct KeyDocument<'a> {
    #[serde(rename = "redeemedKeys")]
    redeemed_keys: &'a [KeyRecord],
}

/// Lenient read shape: records are validated one at a time.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "redeemedKeys", default)]
    redeemed_keys: Vec<RawRecord>,
}

#[derive(Deserialize)]
struct RawRecord {
    user: String,
    key: String,
    #[serde(default)]
    expiration: Value,
}

/// JSON document on disk: `{"redeemedKeys": [{"user", "key", "expiration"}]}`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `path`. Nothing is touched until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The key list file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl KeyStore for JsonFileStore {
    /// A missing or empty file is an empty ledger. Records whose expiration
    /// cannot be decoded are logged and dropped.
    fn load(&self) -> Result<Vec<KeyRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Key store not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let doc: RawDocument = serde_json::from_str(&content)?;
        let mut records = Vec::with_capacity(doc.redeemed_keys.len());
        for raw in doc.redeemed_keys {
            match raw.expiration.as_str().map(str::parse::<Expiration>) {
                Some(Ok(expiration)) => records.push(KeyRecord {
                    user: raw.user,
                    key: raw.key,
                    expiration,
                }),
                _ => {
                    warn!(
                        user = %raw.user,
                        key = %raw.key,
                        expiration = %raw.expiration,
                        "Dropping key record with unreadable expiration"
                    );
                }
            }
        }
        Ok(records)
    }

    fn save(&self, records: &[KeyRecord]) -> Result<(), StoreError> {
        let doc = KeyDocument {
            redeemed_keys: records,
        };

        // Write to temp file first, then atomic rename
        let temp_path = self.temp_path();
        let result = write_document(&temp_path, &doc)
            .and_then(|()| fs::rename(&temp_path, &self.path).map_err(StoreError::from));
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        debug!(path = %self.path.display(), count = records.len(), "Key store saved");
        Ok(())
    }
}

fn write_document(path: &Path, doc: &KeyDocument<'_>) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, doc)?;
    writer.write_all(b"\n")?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

/// Process-memory store for ephemeral deployments and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<KeyRecord>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-existing records (as if loaded from disk).
    pub fn with_records(records: Vec<KeyRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Current stored collection.
    pub fn snapshot(&self) -> Vec<KeyRecord> {
        self.records.lock().clone()
    }
}

impl KeyStore for MemoryStore {
    fn load(&self) -> Result<Vec<KeyRecord>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, records: &[KeyRecord]) -> Result<(), StoreError> {
        *self.records.lock() = records.to_vec();
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl<T: KeyStore + ?Sized> KeyStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Vec<KeyRecord>, StoreError> {
        (**self).load()
    }

    fn save(&self, records: &[KeyRecord]) -> Result<(), StoreError> {
        (**self).save(records)
    }
}
