//! Calculator configuration persistence.
//!
//! Stores user preferences (history depth, blocked-node flash, tree directory,
//! fallback point limits) as JSON at `~/.local/share/talent-calc/config.json`.
//! Loaded once on startup; every field falls back to its default when missing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::history::DEFAULT_HISTORY_DEPTH;
use crate::tree::PointLimits;

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("talent-calc")
}

/// Default config file path.
pub fn default_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Persisted calculator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcConfig {
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    #[serde(default = "default_blocked_flash_ms")]
    pub blocked_flash_ms: u64,
    #[serde(default = "default_trees_dir")]
    pub trees_dir: PathBuf,
    /// Used for trees that don't carry their own limits.
    #[serde(default)]
    pub default_point_limits: PointLimits,
    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    path: PathBuf,
}

fn default_history_depth() -> usize { DEFAULT_HISTORY_DEPTH }
fn default_blocked_flash_ms() -> u64 { 400 }
fn default_trees_dir() -> PathBuf { data_dir().join("trees") }

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            history_depth: default_history_depth(),
            blocked_flash_ms: default_blocked_flash_ms(),
            trees_dir: default_trees_dir(),
            default_point_limits: PointLimits::default(),
            path: default_path(),
        }
    }
}

impl CalcConfig {
    /// Load from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::load_from(&default_path())
    }

    /// Load from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.path = path.to_path_buf();
        config
    }

    /// Persist current config to the path it was loaded from.
    pub fn save(&self) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn blocked_flash(&self) -> Duration {
        Duration::from_millis(self.blocked_flash_ms)
    }
}
