//! Snapshot store implementations.
//!
//! Two media behind the same [`SnapshotStore`] trait: an embedded sled
//! database (bincode values) and a flat directory of JSON files, one per
//! identity. Either satisfies the read-your-writes-per-identity contract;
//! which to use is the caller's choice.

use crate::error::StoreError;
use crate::snapshot::{ScanIdentity, Snapshot, SnapshotStore};
use crate::tree::hasher;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sled-backed snapshot store.
pub struct SledSnapshotStore {
    db: sled::Db,
}

impl SledSnapshotStore {
    /// Open (or create) a sled database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())
            .map_err(|e| StoreError::Open(format!("{:?}: {}", path.as_ref(), e)))?;
        Ok(Self { db })
    }
}

impl SnapshotStore for SledSnapshotStore {
    fn load(&self, identity: &ScanIdentity) -> Result<Option<Snapshot>, StoreError> {
        let key = identity.key();
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| StoreError::Backend(format!("Failed to read snapshot: {}", e)))?
        {
            Some(value) => {
                let snapshot: Snapshot =
                    bincode::deserialize(&value).map_err(|e| StoreError::Corrupt {
                        identity: key,
                        reason: e.to_string(),
                    })?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    fn save(&self, identity: &ScanIdentity, snapshot: &Snapshot) -> Result<(), StoreError> {
        let key = identity.key();
        let value = bincode::serialize(snapshot)
            .map_err(|e| StoreError::Backend(format!("Failed to serialize snapshot: {}", e)))?;

        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| StoreError::Backend(format!("Failed to write snapshot: {}", e)))?;
        self.db
            .flush()
            .map_err(|e| StoreError::Backend(format!("Failed to flush snapshot store: {}", e)))?;

        debug!(identity = %key, file_count = snapshot.file_count(), "Saved snapshot");
        Ok(())
    }
}

/// Flat-file snapshot store: one JSON file per identity under a base
/// directory. File names are the hex digest of the identity key, so
/// arbitrary path and branch characters never leak into file names.
pub struct JsonSnapshotStore {
    base_dir: PathBuf,
}

impl JsonSnapshotStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self, identity: &ScanIdentity) -> PathBuf {
        let key_digest = hasher::hash_content(identity.key().as_bytes());
        self.base_dir.join(format!("{}.json", hex::encode(key_digest)))
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self, identity: &ScanIdentity) -> Result<Option<Snapshot>, StoreError> {
        let path = self.snapshot_path(identity);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)?;
        let snapshot: Snapshot =
            serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                identity: identity.key(),
                reason: e.to_string(),
            })?;
        Ok(Some(snapshot))
    }

    fn save(&self, identity: &ScanIdentity, snapshot: &Snapshot) -> Result<(), StoreError> {
        let path = self.snapshot_path(identity);
        let contents = serde_json::to_vec(snapshot)
            .map_err(|e| StoreError::Backend(format!("Failed to serialize snapshot: {}", e)))?;

        // Write-then-rename so a crash mid-write never leaves a torn file
        // behind for the next load.
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, contents)?;
        std::fs::rename(&tmp_path, &path)?;

        debug!(
            identity = %identity.key(),
            path = %path.display(),
            file_count = snapshot.file_count(),
            "Saved snapshot"
        );
        Ok(())
    }
}
