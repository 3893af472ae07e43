//! Workspace management
//!
//! A workspace is a directory with a `.cascade/` data dir holding the
//! task snapshot, attachment uploads and configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{BlobStore, Config, SnapshotStore};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Workspace already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Not in a cascade workspace. Run 'cascade init' first.")]
    NotInWorkspace,
}

/// A cascade workspace
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(".cascade").is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_workspace(&root)?;
        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;
        Self::open(root)
    }

    /// Initializes a new workspace at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(".cascade");

        if data_dir.is_dir() {
            return Err(WorkspaceError::AlreadyExists(root).into());
        }

        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data dir: {}", data_dir.display()))?;

        let config = Config::default();
        let uploads = data_dir.join(&config.uploads_dir);
        fs::create_dir_all(&uploads)
            .with_context(|| format!("Failed to create uploads dir: {}", uploads.display()))?;

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            config.save(&config_path)?;
        }

        let gitignore_path = data_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "uploads/\n").with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Ok(Self { root, config })
    }

    /// Returns the workspace root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the workspace configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the `.cascade` data directory
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(".cascade")
    }

    /// Snapshot store for this workspace
    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(self.data_dir().join("tasks.jsonl"))
    }

    /// Blob store for this workspace
    pub fn blob_store(&self) -> BlobStore {
        BlobStore::new(self.data_dir().join(&self.config.uploads_dir))
    }
}
