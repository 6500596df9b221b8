//! Directory scanner: walks a codebase root and produces a stable mapping
//! of relative file path to content digest.
//!
//! The iteration order over entries is deterministic (lexicographic by
//! path), which the Merkle tree's order-sensitive root depends on. A
//! single unreadable file never aborts the scan; it is skipped and
//! reported in the outcome.

pub mod config;

pub use config::ScanConfig;

use crate::error::ScanError;
use crate::tree::hasher;
use crate::types::Digest;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

/// A file the scanner could not read. The scan continues past these; they
/// are surfaced so callers and tests can assert on them instead of
/// grepping logs.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Root-relative path with `/` separators.
    pub path: String,
    /// Human-readable reason (typically the I/O error).
    pub reason: String,
}

/// Result of a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Relative path -> content digest, ordered lexicographically by path.
    pub files: BTreeMap<String, Digest>,
    /// Files skipped due to per-file read errors.
    pub skipped: Vec<SkippedFile>,
}

impl ScanOutcome {
    /// Leaf digests in canonical (lexicographic path) order, ready for
    /// `MerkleTree::build`.
    pub fn leaf_digests(&self) -> Vec<Digest> {
        self.files.values().copied().collect()
    }
}

/// Directory scanner for a single codebase root.
pub struct Scanner {
    root: PathBuf,
    config: ScanConfig,
}

impl Scanner {
    /// Create a scanner with the default policy.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: ScanConfig::default(),
        }
    }

    /// Create a scanner with a custom policy.
    pub fn with_config(root: PathBuf, config: ScanConfig) -> Self {
        Self { root, config }
    }

    /// Walk the codebase and hash every recognized source file.
    ///
    /// Structural failures (root missing, root not a directory) are fatal;
    /// per-file read failures land in `ScanOutcome::skipped`.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn scan(&self) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();

        if !self.root.exists() {
            return Err(ScanError::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::RootNotDirectory(self.root.clone()));
        }

        let root = dunce::canonicalize(&self.root).map_err(|e| {
            ScanError::InvalidPath(format!(
                "Failed to canonicalize root {:?}: {}",
                self.root, e
            ))
        })?;

        let mut outcome = ScanOutcome::default();

        let walker = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX))
            .sort_by_file_name();

        for entry in walker.into_iter().filter_entry(|e| !self.prune(e)) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    // Unreadable directory or entry mid-walk: skip, keep going.
                    let path = e
                        .path()
                        .map(|p| relative_path(&root, p).unwrap_or_else(|| p.display().to_string()))
                        .unwrap_or_default();
                    warn!(path = %path, error = %e, "Skipping unreadable entry");
                    outcome.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if !self.is_recognized(&entry) {
                continue;
            }

            let rel = relative_path(&root, entry.path()).ok_or_else(|| {
                ScanError::InvalidPath(format!(
                    "Entry {:?} is outside scan root {:?}",
                    entry.path(),
                    root
                ))
            })?;

            match std::fs::read(entry.path()) {
                Ok(content) => {
                    let digest = hasher::hash_content(&content);
                    outcome.files.insert(rel, digest);
                }
                Err(e) => {
                    warn!(path = %rel, error = %e, "Skipping unreadable file");
                    outcome.skipped.push(SkippedFile {
                        path: rel,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            file_count = outcome.files.len(),
            skipped_count = outcome.skipped.len(),
            duration_ms = start.elapsed().as_millis(),
            "Scan completed"
        );
        debug!(root = %root.display(), "Scanned codebase root");

        Ok(outcome)
    }

    /// Whether an entry's subtree should be pruned. Matched directories are
    /// never descended into, so their contents cannot leak into the map.
    fn prune(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            return true;
        }
        self.config.ignore_dirs.iter().any(|d| d.as_str() == name)
    }

    /// Extension allow-list check with explicit binary/media exclusion.
    fn is_recognized(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy().to_lowercase();

        if self
            .config
            .exclude_extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
        {
            return false;
        }

        self.config
            .include_extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }
}

/// Root-relative path with forward-slash separators, so snapshots are
/// portable across machines and platforms.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_records_recognized_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::write(root.join("main.py"), "print('hi')").unwrap();
        fs::write(root.join("app.ts"), "export {}").unwrap();
        fs::write(root.join("README.md"), "docs").unwrap();

        let outcome = Scanner::new(root).scan().unwrap();

        assert_eq!(outcome.files.len(), 2);
        assert!(outcome.files.contains_key("main.py"));
        assert!(outcome.files.contains_key("app.ts"));
        assert!(!outcome.files.contains_key("README.md"));
    }

    #[test]
    fn test_scan_prunes_ignored_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::write(root.join("top.py"), "x = 1").unwrap();
        fs::create_dir(root.join("node_modules")).unwrap();
        fs::write(root.join("node_modules").join("dep.js"), "module").unwrap();

        let outcome = Scanner::new(root).scan().unwrap();

        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files.contains_key("top.py"));
    }

    #[test]
    fn test_scan_prunes_dot_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::write(root.join("top.py"), "x = 1").unwrap();
        fs::create_dir(root.join(".cache")).unwrap();
        fs::write(root.join(".cache").join("stale.py"), "y = 2").unwrap();

        let outcome = Scanner::new(root).scan().unwrap();

        assert_eq!(outcome.files.len(), 1);
    }

    #[test]
    fn test_scan_excludes_binary_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::write(root.join("logo.png"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("lib.so"), [3u8, 4]).unwrap();
        fs::write(root.join("ok.py"), "pass").unwrap();

        let outcome = Scanner::new(root).scan().unwrap();

        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files.contains_key("ok.py"));
    }

    #[test]
    fn test_scan_paths_are_relative_forward_slash() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::create_dir(root.join("pkg")).unwrap();
        fs::write(root.join("pkg").join("mod.py"), "z = 3").unwrap();

        let outcome = Scanner::new(root).scan().unwrap();

        assert!(outcome.files.contains_key("pkg/mod.py"));
    }

    #[test]
    fn test_scan_order_is_lexicographic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::write(root.join("zz.py"), "z").unwrap();
        fs::write(root.join("aa.py"), "a").unwrap();
        fs::write(root.join("mm.py"), "m").unwrap();

        let outcome = Scanner::new(root).scan().unwrap();
        let paths: Vec<_> = outcome.files.keys().cloned().collect();

        assert_eq!(paths, vec!["aa.py", "mm.py", "zz.py"]);
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let err = Scanner::new(missing).scan().unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(_)));
    }

    #[test]
    fn test_scan_file_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.py");
        fs::write(&file, "x").unwrap();

        let err = Scanner::new(file).scan().unwrap_err();
        assert!(matches!(err, ScanError::RootNotDirectory(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::write(root.join("ok.py"), "fine").unwrap();
        let locked = root.join("locked.py");
        fs::write(&locked, "secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not apply to root; nothing to assert there.
        if fs::read(&locked).is_ok() {
            return;
        }

        let outcome = Scanner::new(root).scan().unwrap();

        assert!(outcome.files.contains_key("ok.py"));
        assert!(!outcome.files.contains_key("locked.py"));
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].path, "locked.py");
    }
}
