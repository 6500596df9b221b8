//! Boundary to the downstream chunking/indexing pipeline.
//!
//! The pipeline itself (chunking, embedding, vector/graph stores) is an
//! external collaborator; this crate only hands it the changed and deleted
//! relative paths for an identity. Deleted paths carry the identity so the
//! pipeline can scope artifact removal to the branch: the same relative
//! path can exist independently on multiple branches.

use crate::detector::{ChangeDetector, DetectOutcome};
use crate::error::DetectError;
use crate::snapshot::ScanIdentity;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Downstream consumer of change-detection results.
pub trait IndexingPipeline {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Re-derive and re-store artifacts for each changed relative path.
    fn reindex(&self, identity: &ScanIdentity, changed: &[String]) -> Result<(), Self::Error>;

    /// Remove artifacts keyed by the deleted relative paths, scoped to the
    /// identity's branch.
    fn remove(&self, identity: &ScanIdentity, deleted: &[String]) -> Result<(), Self::Error>;
}

/// Errors from a combined detect-and-index run.
#[derive(Debug, Error)]
pub enum PipelineError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error("Change detection failed: {0}")]
    Detect(#[from] DetectError),

    #[error("Indexing pipeline failed: {0}")]
    Index(E),
}

/// Run change detection and forward the results to the pipeline.
///
/// An empty change set skips the pipeline entirely; that fast path is the
/// reason the snapshot exists.
pub fn detect_and_index<P: IndexingPipeline>(
    detector: &ChangeDetector,
    pipeline: &P,
    codebase_root: &Path,
    branch: &str,
) -> Result<DetectOutcome, PipelineError<P::Error>> {
    let outcome = detector.detect_changes(codebase_root, branch)?;

    if outcome.changes.is_empty() {
        debug!(identity = %outcome.identity, "No changes; pipeline not invoked");
        return Ok(outcome);
    }

    let changed: Vec<String> = outcome.changes.changed.iter().cloned().collect();
    let deleted: Vec<String> = outcome.changes.deleted.iter().cloned().collect();

    if !changed.is_empty() {
        pipeline
            .reindex(&outcome.identity, &changed)
            .map_err(PipelineError::Index)?;
    }
    if !deleted.is_empty() {
        pipeline
            .remove(&outcome.identity, &deleted)
            .map_err(PipelineError::Index)?;
    }

    info!(
        identity = %outcome.identity,
        reindexed = changed.len(),
        removed = deleted.len(),
        "Pipeline updated"
    );

    Ok(outcome)
}
