//! Procedural level generation: maze carving, seeding, and feature population.

mod features;
mod maze;
mod seed;

pub use features::{Population, PopulationPlan};
pub use maze::{carve_maze, open_grid};
pub use seed::derive_level_seed;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use crate::config::LevelConfig;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::types::{LevelId, LevelKind, Pos};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLevel {
    pub grid: Grid,
    /// Where arrivals from above (or the start of a run, at home) are placed.
    pub entry: Pos,
    pub down_stairs: Option<Pos>,
}

/// Builds the grid for `level`. Home is open floor; every other kind is carved from a
/// fresh RNG seeded by `(run_seed, level, epoch)`.
pub fn generate_level(
    config: &LevelConfig,
    run_seed: u64,
    level: LevelId,
    epoch: u32,
) -> Result<GeneratedLevel, GenerationError> {
    if level.kind == LevelKind::Home {
        return Ok(home_level(config));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(derive_level_seed(run_seed, level, epoch));
    let mut grid = carve_maze(config.width, config.height, &mut rng)?;
    let plan = PopulationPlan {
        features: config.features_per_level,
        blockers: config.blockers_per_level,
        down_stairs: level.depth < deepest(config, level.kind),
    };
    let Some(population) = features::populate(&mut grid, &mut rng, plan) else {
        return Err(GenerationError::NoInterior { width: config.width, height: config.height });
    };

    Ok(GeneratedLevel { grid, entry: population.up_stairs, down_stairs: population.down_stairs })
}

pub fn home_level(config: &LevelConfig) -> GeneratedLevel {
    let grid = open_grid(config.width, config.height);
    let entry = Pos { y: (config.height / 2) as i32, x: (config.width / 2) as i32 };
    GeneratedLevel { grid, entry, down_stairs: None }
}

pub fn deepest(config: &LevelConfig, kind: LevelKind) -> u8 {
    match kind {
        LevelKind::Home => 0,
        LevelKind::Dungeon => config.dungeon_depths,
        LevelKind::Volcano => config.volcano_depths,
    }
}
