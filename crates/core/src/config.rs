//! Level dimensions, depth bounds, and population density, loadable from TOML.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_WIDTH: usize = 40;
pub const DEFAULT_HEIGHT: usize = 20;
pub const DEFAULT_DUNGEON_DEPTHS: u8 = 10;
pub const DEFAULT_VOLCANO_DEPTHS: u8 = 13;
const MAX_CELLS: usize = 1 << 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read level config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse level config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid level config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    pub width: usize,
    pub height: usize,
    pub dungeon_depths: u8,
    pub volcano_depths: u8,
    /// Displaceable features scattered on each carved level.
    pub features_per_level: usize,
    /// Statues and thrones, placed on dead ends only.
    pub blockers_per_level: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            dungeon_depths: DEFAULT_DUNGEON_DEPTHS,
            volcano_depths: DEFAULT_VOLCANO_DEPTHS,
            features_per_level: 6,
            blockers_per_level: 1,
        }
    }
}

impl LevelConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects shapes no level could have. Grids too small to carve are still accepted
    /// here and fail at generation time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.saturating_mul(self.height) > MAX_CELLS {
            return Err(ConfigError::Invalid(format!(
                "{}x{} exceeds the {MAX_CELLS} cell limit",
                self.width, self.height
            )));
        }
        if self.dungeon_depths == 0 || self.volcano_depths == 0 {
            return Err(ConfigError::Invalid("each branch needs at least one depth".to_string()));
        }
        Ok(())
    }
}
