//! Deltatree: Merkle-based change detection for incremental codebase
//! indexing.
//!
//! Scans a codebase root into a relative-path -> content-digest map, builds
//! a Merkle tree over the digests, and diffs against the previous stored
//! snapshot to report exactly which files changed or were deleted. The
//! common "nothing changed" case is a single root-digest comparison.
//!
//! This is a library: it has no CLI, no network surface, and no knowledge
//! of the downstream chunking/embedding pipeline beyond the
//! [`pipeline::IndexingPipeline`] boundary trait.

pub mod config;
pub mod detector;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod scan;
pub mod snapshot;
pub mod tree;
pub mod types;

pub use config::{ConfigLoader, DeltatreeConfig, SnapshotBackend, StorageConfig};
pub use detector::{ChangeDetector, DetectOutcome};
pub use error::{DetectError, ScanError, StoreError};
pub use scan::{ScanConfig, ScanOutcome, Scanner, SkippedFile};
pub use snapshot::{
    diff, ChangeSet, JsonSnapshotStore, ScanIdentity, SledSnapshotStore, Snapshot, SnapshotStore,
};
pub use tree::MerkleTree;
pub use types::Digest;
