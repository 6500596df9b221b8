//! Error types for the change-detection core.
//!
//! Transient per-file read failures are never represented here: the scanner
//! skips those files and reports them in the scan outcome instead. These
//! enums cover the fatal cases only.

use std::path::PathBuf;
use thiserror::Error;

/// Structural scan errors. Any of these aborts the scan with no snapshot
/// produced or stored.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Codebase root not found: {0:?}")]
    RootNotFound(PathBuf),

    #[error("Codebase root is not a directory: {0:?}")]
    RootNotDirectory(PathBuf),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Scan I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Snapshot store errors. A load failure is distinct from a legitimate
/// "no previous snapshot" (which is `Ok(None)` on the store interface),
/// so a storage outage is never mistaken for a first scan.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open snapshot store: {0}")]
    Open(String),

    #[error("Snapshot store backend error: {0}")]
    Backend(String),

    #[error("Corrupt snapshot for identity '{identity}': {reason}")]
    Corrupt { identity: String, reason: String },

    #[error("Snapshot store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the change detector.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Snapshot store failed: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for DetectError {
    fn from(err: config::ConfigError) -> Self {
        DetectError::Config(err.to_string())
    }
}
