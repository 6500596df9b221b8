//! Change detector: orchestrates scan, diff, and snapshot persistence for
//! one (codebase root, branch) identity per call.

use crate::error::DetectError;
use crate::scan::{ScanConfig, Scanner, SkippedFile};
use crate::snapshot::{diff, ChangeSet, ScanIdentity, Snapshot, SnapshotStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Result of one change-detection invocation.
#[derive(Debug, Clone)]
pub struct DetectOutcome {
    /// The resolved identity this detection ran against.
    pub identity: ScanIdentity,
    /// Changed (added or modified) and deleted relative paths.
    pub changes: ChangeSet,
    /// Files the scan skipped due to per-file read errors.
    pub skipped: Vec<SkippedFile>,
    /// True when no previous snapshot existed for this identity.
    pub first_scan: bool,
}

/// Detects which files changed, were added, or were deleted since the
/// previous snapshot of a codebase, without re-reading unchanged content
/// through downstream pipelines.
///
/// Calls for the same identity are serialized internally; calls for
/// different identities run independently.
pub struct ChangeDetector {
    store: Arc<dyn SnapshotStore>,
    scan_config: ScanConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChangeDetector {
    /// Create a detector over the given snapshot store with the default
    /// scan policy.
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            store,
            scan_config: ScanConfig::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create a detector with a custom scan policy.
    pub fn with_scan_config(store: Arc<dyn SnapshotStore>, scan_config: ScanConfig) -> Self {
        Self {
            store,
            scan_config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Scan the codebase, diff against the stored previous snapshot, and
    /// persist the current snapshot as the new previous.
    ///
    /// On the first call for an identity every discovered file is reported
    /// as changed and nothing as deleted. The snapshot is written even when
    /// the change set is empty, so the next call's root comparison stays
    /// valid; it is written only after the scan completed in full. Fatal
    /// scan and store errors propagate, never an empty change set.
    #[instrument(skip_all, fields(root = %codebase_root.display(), branch = %branch))]
    pub fn detect_changes(
        &self,
        codebase_root: &Path,
        branch: &str,
    ) -> Result<DetectOutcome, DetectError> {
        let start = Instant::now();
        let identity = ScanIdentity::resolve(codebase_root, branch)?;

        // At most one in-flight detection per identity: two concurrent
        // scans racing to save would lose one scan's snapshot.
        let lock = self.identity_lock(&identity);
        let _guard = lock.lock();

        let scanner =
            Scanner::with_config(identity.codebase_root().to_path_buf(), self.scan_config.clone());
        let outcome = scanner.scan()?;

        let current = Snapshot::from_files(outcome.files);

        let previous = self.store.load(&identity)?;
        let first_scan = previous.is_none();
        let changes = match &previous {
            Some(previous) => diff(previous, &current),
            None => {
                debug!(identity = %identity, "No previous snapshot; all files changed");
                ChangeSet {
                    changed: current.files().keys().cloned().collect(),
                    deleted: Default::default(),
                }
            }
        };

        self.store.save(&identity, &current)?;

        info!(
            identity = %identity,
            changed = changes.changed.len(),
            deleted = changes.deleted.len(),
            skipped = outcome.skipped.len(),
            first_scan,
            duration_ms = start.elapsed().as_millis(),
            "Change detection completed"
        );

        Ok(DetectOutcome {
            identity,
            changes,
            skipped: outcome.skipped,
            first_scan,
        })
    }

    /// One mutex per identity key, created on first use and retained for
    /// the detector's lifetime. The map is bounded by the number of
    /// distinct (codebase, branch) pairs a process scans, which is small;
    /// entries are never pruned.
    fn identity_lock(&self, identity: &ScanIdentity) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(identity.key())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
