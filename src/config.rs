//! Configuration system.
//!
//! Layered loading via the `config` crate: merged defaults, then the
//! global file (`~/.config/deltatree/config.toml`), then the workspace
//! file (`deltatree.toml`), then `DELTATREE_*` environment variables.

use crate::error::{DetectError, StoreError};
use crate::logging::LoggingConfig;
use crate::scan::ScanConfig;
use crate::snapshot::{JsonSnapshotStore, SledSnapshotStore, SnapshotStore};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeltatreeConfig {
    /// Scan policy (include/exclude rules).
    #[serde(default)]
    pub scan: ScanConfig,

    /// Snapshot storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Snapshot storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotBackend {
    Sled,
    Json,
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage medium for snapshots.
    #[serde(default = "default_backend")]
    pub backend: SnapshotBackend,

    /// Where the snapshot store lives on disk.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

fn default_backend() -> SnapshotBackend {
    SnapshotBackend::Sled
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from(".deltatree/snapshots")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl StorageConfig {
    /// Open the configured snapshot store.
    pub fn open_store(&self) -> Result<Arc<dyn SnapshotStore>, StoreError> {
        match self.backend {
            SnapshotBackend::Sled => Ok(Arc::new(SledSnapshotStore::open(&self.snapshot_path)?)),
            SnapshotBackend::Json => Ok(Arc::new(JsonSnapshotStore::new(&self.snapshot_path)?)),
        }
    }
}

/// Configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full layering applied.
    pub fn load() -> Result<DeltatreeConfig, DetectError> {
        let mut builder = builder_with_defaults()?;
        builder = add_global_file(builder);
        builder = add_workspace_file(builder, Path::new("."));
        builder = builder.add_source(Environment::with_prefix("DELTATREE").separator("__"));

        let config = builder.build()?;
        let loaded: DeltatreeConfig = config.try_deserialize()?;
        debug!(backend = ?loaded.storage.backend, "Configuration loaded");
        Ok(loaded)
    }

    /// Load configuration for a specific workspace directory.
    pub fn load_for_workspace(workspace_root: &Path) -> Result<DeltatreeConfig, DetectError> {
        let mut builder = builder_with_defaults()?;
        builder = add_global_file(builder);
        builder = add_workspace_file(builder, workspace_root);
        builder = builder.add_source(Environment::with_prefix("DELTATREE").separator("__"));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

/// Builder seeded with merge-policy defaults.
fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, DetectError> {
    Ok(Config::builder()
        .set_default("storage.backend", "sled")?
        .set_default("storage.snapshot_path", ".deltatree/snapshots")?)
}

/// Path to the global config file, honoring `XDG_CONFIG_HOME`.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join("deltatree").join("config.toml"));
    }
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("deltatree")
            .join("config.toml")
    })
}

fn add_global_file(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) if path.exists() => {
            builder.add_source(File::from(path).required(false))
        }
        _ => builder,
    }
}

fn add_workspace_file(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> ConfigBuilder<DefaultState> {
    let path = workspace_root.join("deltatree.toml");
    if path.exists() {
        builder.add_source(File::from(path).required(false))
    } else {
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_config() {
        let config = DeltatreeConfig::default();
        assert_eq!(config.storage.backend, SnapshotBackend::Sled);
        assert_eq!(
            config.storage.snapshot_path,
            PathBuf::from(".deltatree/snapshots")
        );
        assert!(config.scan.include_extensions.contains(&".py".to_string()));
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let toml = r#"
            [storage]
            backend = "json"
            snapshot_path = "/tmp/snapshots"

            [scan]
            include_extensions = [".rs"]
        "#;

        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        let loaded: DeltatreeConfig = config.try_deserialize().unwrap();

        assert_eq!(loaded.storage.backend, SnapshotBackend::Json);
        assert_eq!(loaded.storage.snapshot_path, PathBuf::from("/tmp/snapshots"));
        assert_eq!(loaded.scan.include_extensions, vec![".rs".to_string()]);
        // Unspecified sections keep their defaults.
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn test_open_store_json_backend() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = StorageConfig {
            backend: SnapshotBackend::Json,
            snapshot_path: temp_dir.path().join("snaps"),
        };
        assert!(storage.open_store().is_ok());
    }
}
