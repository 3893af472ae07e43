//! Configuration handling
//!
//! Configuration lives in `.cascade/config.toml` (workspace) with a
//! global fallback at the platform config dir (via `directories`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Termination cause recorded when `cascade done` is run without one
    pub default_cause: String,

    /// Directory (relative to `.cascade/`) holding attachment blobs
    pub uploads_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_cause: "Manual".to_string(),
            uploads_dir: "uploads".to_string(),
        }
    }
}

impl Config {
    /// Loads the config for a workspace root, falling back to the
    /// global config, falling back to defaults
    pub fn for_workspace(root: &Path) -> Result<Self> {
        let workspace_path = root.join(".cascade").join("config.toml");
        if workspace_path.exists() {
            return Self::load(&workspace_path);
        }

        if let Some(global) = Self::global_path() {
            if global.exists() {
                return Self::load(&global);
            }
        }

        Ok(Self::default())
    }

    /// Loads a config file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Writes the config to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, raw).with_context(|| format!("Failed to write config: {}", path.display()))
    }

    /// Platform global config path (`~/.config/cascade/config.toml` on Linux)
    pub fn global_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cascade").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Walks up from the current directory looking for a `.cascade` dir
    pub fn find_workspace_root() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;

        loop {
            if dir.join(".cascade").is_dir() {
                return Some(dir);
            }
            if !dir.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.default_cause, "Manual");
        assert_eq!(config.uploads_dir, "uploads");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.default_cause = "Done".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.default_cause, "Done");
        assert_eq!(loaded.uploads_dir, "uploads");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_cause = \"Shipped\"\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.default_cause, "Shipped");
        assert_eq!(loaded.uploads_dir, "uploads");
    }

    #[test]
    fn missing_workspace_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::for_workspace(dir.path()).unwrap();
        assert_eq!(config.default_cause, "Manual");
    }
}
