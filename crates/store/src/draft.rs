//! The draft store contract and its two backends.
//!
//! Every entry is stored as `{ "data": ..., "savedAt": ... }` under a key
//! namespaced with [`DRAFT_PREFIX`]. `clear_all` removes every key under the
//! prefix and nothing else; it runs exactly once, after a confirmed final
//! submission.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Namespace prefix for every draft key.
pub const DRAFT_PREFIX: &str = "candidature_draft_";

/// One persisted draft: the form value and when it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftEntry {
    pub data: serde_json::Value,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

/// Contract shared by the in-memory and file-backed caches.
///
/// Callers treat failures as non-fatal: in-memory form state stays correct
/// even when persistence fails.
pub trait DraftStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<DraftEntry>, StoreError>;

    /// Persist `data` under `key` and return the save timestamp.
    fn save(&self, key: &str, data: &serde_json::Value) -> Result<DateTime<Utc>, StoreError>;

    fn clear(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every draft under [`DRAFT_PREFIX`].
    fn clear_all(&self) -> Result<(), StoreError>;
}

fn namespaced(key: &str) -> String {
    format!("{DRAFT_PREFIX}{key}")
}

/// Volatile backend, used in tests and as a fallback when no storage
/// directory is available.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: Mutex<HashMap<String, DraftEntry>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self, key: &str) -> Result<Option<DraftEntry>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(&namespaced(key)).cloned())
    }

    fn save(&self, key: &str, data: &serde_json::Value) -> Result<DateTime<Utc>, StoreError> {
        let saved_at = Utc::now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            namespaced(key),
            DraftEntry {
                data: data.clone(),
                saved_at,
            },
        );
        Ok(saved_at)
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(&namespaced(key));
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|k, _| !k.starts_with(DRAFT_PREFIX));
        Ok(())
    }
}

/// File-backed cache: one JSON file per draft key under a directory.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    /// Open (and create if needed) the storage directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespaced(key)))
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self, key: &str) -> Result<Option<DraftEntry>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, data: &serde_json::Value) -> Result<DateTime<Utc>, StoreError> {
        let saved_at = Utc::now();
        let entry = DraftEntry {
            data: data.clone(),
            saved_at,
        };
        fs::write(self.path_for(key), serde_json::to_vec(&entry)?)?;
        Ok(saved_at)
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            let matches_prefix = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(DRAFT_PREFIX));
            if matches_prefix {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
