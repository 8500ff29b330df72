pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod level;
pub mod manifest;
pub mod mapgen;
pub mod stack;
pub mod tracker;
pub mod types;

pub use cell::{Cell, Feature, FeatureKind, Renderable};
pub use config::{ConfigError, LevelConfig};
pub use error::{Blocker, DungeonError, GenerationError, UsageError};
pub use grid::Grid;
pub use level::{Level, Placement};
pub use manifest::{LevelEpoch, ManifestError, StackManifest};
pub use stack::{LevelEvent, LevelStack};
pub use tracker::CellChange;
pub use types::*;
