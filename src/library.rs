//! Tree file discovery.
//!
//! Scans a directory (recursively) for `*.json` tree exports and indexes them
//! by spec id. Only the header fields are read during discovery; the full tree
//! is parsed on [`TreeLibrary::load`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::tree::{PointLimits, TalentTree};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeHeader {
    tree_id: u32,
    spec_id: u32,
    #[serde(default)]
    spec_name: String,
    #[serde(default)]
    class_name: String,
}

/// A discovered tree file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    pub path: PathBuf,
    pub tree_id: u32,
    pub spec_id: u32,
    pub spec_name: String,
    pub class_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct TreeLibrary {
    by_spec: BTreeMap<u32, TreeFile>,
    default_limits: PointLimits,
}

impl TreeLibrary {
    /// Index every readable tree file under `dir`. Unreadable files are skipped.
    pub fn discover(dir: &Path, default_limits: PointLimits) -> Self {
        let mut by_spec: BTreeMap<u32, TreeFile> = BTreeMap::new();

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        {
            let path = entry.path();
            match read_header(path) {
                Ok(header) => {
                    if let Some(previous) = by_spec.get(&header.spec_id) {
                        tracing::warn!(
                            "Spec {} defined by both {} and {}; keeping the latter",
                            header.spec_id,
                            previous.path.display(),
                            path.display()
                        );
                    }
                    by_spec.insert(
                        header.spec_id,
                        TreeFile {
                            path: path.to_path_buf(),
                            tree_id: header.tree_id,
                            spec_id: header.spec_id,
                            spec_name: header.spec_name,
                            class_name: header.class_name,
                        },
                    );
                }
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }

        tracing::debug!("Discovered {} tree(s) under {}", by_spec.len(), dir.display());
        Self {
            by_spec,
            default_limits,
        }
    }

    pub fn get(&self, spec_id: u32) -> Option<&TreeFile> {
        self.by_spec.get(&spec_id)
    }

    /// Discovered trees by ascending spec id.
    pub fn files(&self) -> impl Iterator<Item = &TreeFile> {
        self.by_spec.values()
    }

    pub fn len(&self) -> usize {
        self.by_spec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_spec.is_empty()
    }

    /// Parse the full tree for `spec_id`.
    pub fn load(&self, spec_id: u32) -> Result<TalentTree> {
        let file = self.get(spec_id).ok_or(Error::SpecNotFound(spec_id))?;
        TalentTree::load(&file.path, &self.default_limits)
    }
}

fn read_header(path: &Path) -> Result<TreeHeader> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
