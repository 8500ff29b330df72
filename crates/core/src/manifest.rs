use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::LevelConfig;
use crate::types::LevelId;

pub const MANIFEST_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to access manifest {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("manifest {} is not valid: {source}", .path.display())]
    Format { path: PathBuf, source: serde_json::Error },
}

impl ManifestError {
    fn io(path: &Path, source: io::Error) -> Self {
        ManifestError::Io { path: path.to_path_buf(), source }
    }
}

/// How many times a level has been reset. Levels never reset are omitted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelEpoch {
    pub level: LevelId,
    pub epoch: u32,
}

/// Grids are not stored: the seed, config, and epochs regenerate them exactly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StackManifest {
    pub format_version: u32,
    pub run_seed: u64,
    pub config: LevelConfig,
    pub epochs: Vec<LevelEpoch>,
    pub active: LevelId,
}

impl StackManifest {
    /// Writes beside `path` first and renames over it, so readers never see a partial file.
    pub fn write_atomic(&self, path: &Path) -> Result<(), ManifestError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ManifestError::Format { path: path.to_path_buf(), source })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ManifestError::io(parent, e))?;
        }

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| ManifestError::io(&tmp_path, e))?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(ManifestError::io(path, e));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|source| ManifestError::Format { path: path.to_path_buf(), source })
    }
}
