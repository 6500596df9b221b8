//! Snapshots: one point-in-time (tree, path->digest map) pair per
//! (codebase root, branch) identity, plus the diff between two of them.
//!
//! The map is retained alongside the tree because the tree alone cannot
//! name which paths changed; it only makes the "nothing changed" case a
//! single root comparison.

pub mod persistence;

pub use persistence::{JsonSnapshotStore, SledSnapshotStore};

use crate::error::{ScanError, StoreError};
use crate::scan::ScanOutcome;
use crate::tree::MerkleTree;
use crate::types::Digest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Key for snapshot storage: a canonical codebase root plus a branch label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanIdentity {
    codebase_root: PathBuf,
    branch: String,
}

impl ScanIdentity {
    /// Build an identity from a codebase root and branch label.
    ///
    /// The root is canonicalized so symlink or relative-path variation does
    /// not create spurious distinct identities. An empty branch falls back
    /// to `"default"`.
    pub fn resolve(codebase_root: &Path, branch: &str) -> Result<Self, ScanError> {
        if !codebase_root.exists() {
            return Err(ScanError::RootNotFound(codebase_root.to_path_buf()));
        }
        if !codebase_root.is_dir() {
            return Err(ScanError::RootNotDirectory(codebase_root.to_path_buf()));
        }
        let canonical = dunce::canonicalize(codebase_root).map_err(|e| {
            ScanError::InvalidPath(format!(
                "Failed to canonicalize {:?}: {}",
                codebase_root, e
            ))
        })?;

        let branch = branch.trim();
        let branch = if branch.is_empty() { "default" } else { branch };

        Ok(Self {
            codebase_root: canonical,
            branch: branch.to_string(),
        })
    }

    /// The canonical codebase root.
    pub fn codebase_root(&self) -> &Path {
        &self.codebase_root
    }

    /// The branch label.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Storage key, `<codebase_root>:<branch>`. The path component is
    /// Unicode-normalized (NFC) so equivalent encodings map to one key.
    pub fn key(&self) -> String {
        let root: String = self.codebase_root.to_string_lossy().nfc().collect();
        format!("{}:{}", root, self.branch)
    }
}

impl fmt::Display for ScanIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One point-in-time scan result: the Merkle root plus the full relative
/// path -> content digest map it was built from.
///
/// The root is always derived from the map (in lexicographic path order)
/// at construction; the two cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    root: Digest,
    files: BTreeMap<String, Digest>,
}

impl Snapshot {
    /// Build a snapshot from a path -> digest map.
    pub fn from_files(files: BTreeMap<String, Digest>) -> Self {
        let leaves: Vec<Digest> = files.values().copied().collect();
        let tree = MerkleTree::build(&leaves);
        Self {
            root: *tree.root(),
            files,
        }
    }

    /// Build a snapshot from a completed scan.
    pub fn from_scan(outcome: &ScanOutcome) -> Self {
        Self::from_files(outcome.files.clone())
    }

    /// The summary digest of the whole snapshot.
    pub fn root(&self) -> &Digest {
        &self.root
    }

    /// Relative path -> digest map, in lexicographic path order.
    pub fn files(&self) -> &BTreeMap<String, Digest> {
        &self.files
    }

    /// Number of files in the snapshot.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// The result of diffing two snapshots: disjoint sets of relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Paths added or modified since the previous snapshot.
    pub changed: BTreeSet<String>,
    /// Paths present previously but gone now.
    pub deleted: BTreeSet<String>,
}

impl ChangeSet {
    /// True when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deleted.is_empty()
    }

    /// Changed and deleted paths combined, for consumers that treat both
    /// as "touched".
    pub fn all_paths(&self) -> Vec<String> {
        self.changed.iter().chain(self.deleted.iter()).cloned().collect()
    }
}

/// Diff two snapshots into a change set.
///
/// Equal roots short-circuit to an empty change set without touching the
/// maps; that single comparison is the main reason the tree exists.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> ChangeSet {
    if previous.root() == current.root() {
        return ChangeSet::default();
    }

    let mut changes = ChangeSet::default();

    for (path, digest) in current.files() {
        match previous.files().get(path) {
            Some(prev_digest) if prev_digest == digest => {}
            _ => {
                changes.changed.insert(path.clone());
            }
        }
    }

    for path in previous.files().keys() {
        if !current.files().contains_key(path) {
            changes.deleted.insert(path.clone());
        }
    }

    changes
}

/// Snapshot store interface.
///
/// `load` returning `Ok(None)` means the identity has never been scanned;
/// `Err` means the store itself failed. Callers must not collapse the two:
/// a storage outage masquerading as "no previous snapshot" would report
/// everything as changed. The store must provide read-your-writes
/// consistency per identity.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, identity: &ScanIdentity) -> Result<Option<Snapshot>, StoreError>;
    fn save(&self, identity: &ScanIdentity, snapshot: &Snapshot) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::hasher;
    use tempfile::TempDir;

    fn digest(label: &str) -> Digest {
        hasher::hash_content(label.as_bytes())
    }

    fn snapshot(entries: &[(&str, &str)]) -> Snapshot {
        let files: BTreeMap<String, Digest> = entries
            .iter()
            .map(|(path, content)| ((*path).to_string(), digest(content)))
            .collect();
        Snapshot::from_files(files)
    }

    #[test]
    fn test_identity_default_branch() {
        let temp_dir = TempDir::new().unwrap();
        let identity = ScanIdentity::resolve(temp_dir.path(), "").unwrap();
        assert_eq!(identity.branch(), "default");
        assert!(identity.key().ends_with(":default"));
    }

    #[test]
    fn test_identity_canonicalizes_relative_variation() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let direct = ScanIdentity::resolve(root, "main").unwrap();
        let dotted = ScanIdentity::resolve(&root.join("."), "main").unwrap();

        assert_eq!(direct.key(), dotted.key());
    }

    #[test]
    fn test_identity_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let err = ScanIdentity::resolve(&temp_dir.path().join("gone"), "main").unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(_)));
    }

    #[test]
    fn test_snapshot_root_derived_from_files() {
        let snap = snapshot(&[("a.py", "x"), ("b.py", "y")]);
        let tree = MerkleTree::build(&[digest("x"), digest("y")]);
        assert_eq!(snap.root(), tree.root());
    }

    #[test]
    fn test_empty_snapshot_has_sentinel_root() {
        let snap = Snapshot::from_files(BTreeMap::new());
        assert_eq!(snap.root(), &hasher::empty_sentinel());
    }

    #[test]
    fn test_diff_equal_snapshots_is_empty() {
        let prev = snapshot(&[("a.py", "x"), ("b.py", "y")]);
        let curr = snapshot(&[("a.py", "x"), ("b.py", "y")]);
        assert!(diff(&prev, &curr).is_empty());
    }

    #[test]
    fn test_diff_insertion_order_does_not_matter() {
        // Structurally equal maps built in different insertion order must
        // hit the root fast path.
        let mut forward = BTreeMap::new();
        forward.insert("a.py".to_string(), digest("x"));
        forward.insert("b.py".to_string(), digest("y"));

        let mut reversed = BTreeMap::new();
        reversed.insert("b.py".to_string(), digest("y"));
        reversed.insert("a.py".to_string(), digest("x"));

        let prev = Snapshot::from_files(forward);
        let curr = Snapshot::from_files(reversed);

        assert_eq!(prev.root(), curr.root());
        assert!(diff(&prev, &curr).is_empty());
    }

    #[test]
    fn test_diff_partitions_added_modified_deleted() {
        let prev = snapshot(&[("a.py", "h1"), ("b.py", "h2")]);
        let curr = snapshot(&[("a.py", "h1"), ("c.py", "h3")]);

        let changes = diff(&prev, &curr);

        assert_eq!(changes.changed.len(), 1);
        assert!(changes.changed.contains("c.py"));
        assert_eq!(changes.deleted.len(), 1);
        assert!(changes.deleted.contains("b.py"));
        assert!(!changes.changed.contains("a.py"));
        assert!(!changes.deleted.contains("a.py"));
    }

    #[test]
    fn test_diff_detects_modified_content() {
        let prev = snapshot(&[("a.py", "before")]);
        let curr = snapshot(&[("a.py", "after")]);

        let changes = diff(&prev, &curr);
        assert!(changes.changed.contains("a.py"));
        assert!(changes.deleted.is_empty());
    }

    #[test]
    fn test_changeset_all_paths_combines_both() {
        let prev = snapshot(&[("a.py", "1"), ("b.py", "2")]);
        let curr = snapshot(&[("a.py", "modified")]);

        let changes = diff(&prev, &curr);
        let all = changes.all_paths();
        assert!(all.contains(&"a.py".to_string()));
        assert!(all.contains(&"b.py".to_string()));
    }
}
