//! Scanner configuration: include/exclude rules.
//!
//! The rule sets are configuration, not core logic. The contract is an
//! allow-list: a file is recorded only when its extension is recognized,
//! everything else is silently skipped.

use serde::{Deserialize, Serialize};

/// Directory scan policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extensions of recognized source files (with leading dot).
    #[serde(default = "default_include_extensions")]
    pub include_extensions: Vec<String>,

    /// Extensions excluded even if they were ever allow-listed
    /// (binary/media/archive/compiled artifacts).
    #[serde(default = "default_exclude_extensions")]
    pub exclude_extensions: Vec<String>,

    /// Directory names pruned entirely by exact match.
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    /// Whether to follow symbolic links (default: false for determinism).
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Maximum traversal depth (None = unlimited).
    #[serde(default)]
    pub max_depth: Option<usize>,
}

fn default_include_extensions() -> Vec<String> {
    [".py", ".js", ".jsx", ".ts", ".tsx"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

fn default_exclude_extensions() -> Vec<String> {
    [
        // Images
        ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".ico", ".svg",
        // Documents
        ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
        // Archives
        ".zip", ".tar", ".gz", ".rar", ".7z",
        // Binaries
        ".exe", ".dll", ".so", ".dylib",
        // Media
        ".mp3", ".mp4", ".wav", ".avi", ".mov",
        // Fonts
        ".ttf", ".otf", ".woff", ".woff2",
        // Python bytecode
        ".pyc", ".pyo", ".pyd",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

fn default_ignore_dirs() -> Vec<String> {
    [
        ".git",
        ".venv",
        "env",
        "venv",
        "node_modules",
        "__pycache__",
        ".idea",
        ".vscode",
        "dist",
        "build",
        ".pytest_cache",
        ".mypy_cache",
        "vendor",
        "tmp",
        ".dart_tool",
        "media",
        "static",
        "assets",
        "images",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_extensions: default_include_extensions(),
            exclude_extensions: default_exclude_extensions(),
            ignore_dirs: default_ignore_dirs(),
            follow_symlinks: false,
            max_depth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_allow_list() {
        let config = ScanConfig::default();
        assert!(config.include_extensions.contains(&".py".to_string()));
        assert!(config.exclude_extensions.contains(&".png".to_string()));
        assert!(config.ignore_dirs.contains(&"node_modules".to_string()));
        assert!(!config.follow_symlinks);
    }
}
