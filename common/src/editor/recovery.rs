//! Recovery snapshots of unsaved work.
//!
//! While the working document differs from the baseline, a snapshot is kept
//! in a keyed string store so an accidental reload can offer it back. Keys are
//! derived from the baseline, which keeps them stable across reloads of the
//! same generated page and keeps unrelated sessions apart.
//!
//! Writes are best effort: a full store is pruned of other snapshots once and
//! the write retried once; after that the snapshot is dropped and the edit
//! goes on.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const RECOVERY_KEY_PREFIX: &str = "site-editor:recovery:";

/// Characters of the baseline that go into the key hash.
pub const RECOVERY_KEY_SAMPLE_CHARS: usize = 2048;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("recovery storage quota exceeded")]
    QuotaExceeded,
    #[error("recovery storage unavailable: {0}")]
    Unavailable(String),
}

/// Keyed raw-string store, e.g. the browser's `localStorage`.
pub trait RecoveryStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), RecoveryError>;
    fn remove(&mut self, key: &str);
    /// Every key currently stored, used for pruning.
    fn keys(&self) -> Vec<String>;
}

impl<S: RecoveryStore + ?Sized> RecoveryStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RecoveryError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// What gets written under a recovery key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySnapshot {
    pub working_document: String,
    pub file_path: String,
}

pub fn recovery_key(original: &str) -> String {
    let sample: String = original.chars().take(RECOVERY_KEY_SAMPLE_CHARS).collect();
    format!("{}{:x}", RECOVERY_KEY_PREFIX, md5::compute(sample))
}

/// Reads and decodes the snapshot under `key`. Undecodable entries are
/// removed.
pub fn read_snapshot<S: RecoveryStore>(store: &mut S, key: &str) -> Option<RecoverySnapshot> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!("dropping unreadable recovery snapshot {}: {}", key, err);
            store.remove(key);
            None
        }
    }
}

/// Writes `snapshot` under `key`. Returns whether it was stored.
pub fn write_snapshot<S: RecoveryStore>(
    store: &mut S,
    key: &str,
    snapshot: &RecoverySnapshot,
) -> bool {
    let value = match serde_json::to_string(snapshot) {
        Ok(value) => value,
        Err(err) => {
            warn!("could not encode recovery snapshot: {}", err);
            return false;
        }
    };

    match store.set(key, &value) {
        Ok(()) => true,
        Err(RecoveryError::QuotaExceeded) => {
            let pruned = prune_snapshots(store, key);
            debug!("recovery store full, pruned {} snapshots", pruned);
            match store.set(key, &value) {
                Ok(()) => true,
                Err(err) => {
                    warn!("recovery snapshot abandoned: {}", err);
                    false
                }
            }
        }
        Err(err) => {
            warn!("recovery snapshot abandoned: {}", err);
            false
        }
    }
}

/// Removes every recovery snapshot except the one under `keep`.
pub fn prune_snapshots<S: RecoveryStore>(store: &mut S, keep: &str) -> usize {
    let stale: Vec<String> = store
        .keys()
        .into_iter()
        .filter(|key| key.starts_with(RECOVERY_KEY_PREFIX) && key != keep)
        .collect();
    for key in &stale {
        store.remove(key);
    }
    stale.len()
}

/// In-process store with an optional byte quota over all stored values.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecoveryStore {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryRecoveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(_, value)| value.len())
            .sum()
    }
}

impl RecoveryStore for MemoryRecoveryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RecoveryError> {
        if let Some(quota) = self.quota {
            if self.used_without(key) + value.len() > quota {
                return Err(RecoveryError::QuotaExceeded);
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
