use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::importer::{load_bytes, read_source};
use crate::models::RowSet;

/// SHA-256 of the file contents, hex encoded. Two loads of byte-identical
/// content share a key regardless of path or mtime.
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Memoizes normalized row-sets by content checksum. Failed loads are not cached.
#[derive(Default)]
pub struct LoadCache {
    entries: Mutex<HashMap<String, Arc<RowSet>>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<RowSet>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn load(&self, path: &Path) -> Result<Arc<RowSet>> {
        let bytes = read_source(path)?;
        let key = compute_checksum(&bytes);
        if let Some(hit) = self.entries().get(&key) {
            debug!("cache hit for {} ({})", path.display(), &key[..12]);
            return Ok(Arc::clone(hit));
        }
        let rows = Arc::new(load_bytes(path, &bytes)?);
        self.entries().insert(key, Arc::clone(&rows));
        Ok(rows)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }
}
