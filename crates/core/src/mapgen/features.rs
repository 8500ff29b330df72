//! Stairs, scattered objects, and movement blockers placed onto a carved maze.

use rand_chacha::rand_core::Rng;

use crate::cell::{Cell, Feature, FeatureKind};
use crate::grid::Grid;
use crate::types::Pos;

use super::seed::random_index;

const SCATTERED_KINDS: [FeatureKind; 5] = [
    FeatureKind::Chest,
    FeatureKind::Fountain,
    FeatureKind::Trap,
    FeatureKind::Altar,
    FeatureKind::Gold,
];
const BLOCKER_KINDS: [FeatureKind; 2] = [FeatureKind::Statue, FeatureKind::Throne];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopulationPlan {
    pub features: usize,
    pub blockers: usize,
    pub down_stairs: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Population {
    pub up_stairs: Pos,
    pub down_stairs: Option<Pos>,
}

/// Returns `None` when the grid has no open cell to stand on.
pub(crate) fn populate<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
    plan: PopulationPlan,
) -> Option<Population> {
    let center = Pos { y: (grid.height() / 2) as i32, x: (grid.width() / 2) as i32 };
    let up_stairs = nearest_open_cell(grid, center)?;

    let down_stairs = if plan.down_stairs {
        grid.flood_fill(up_stairs, |cell| *cell == Cell::Empty)
            .last()
            .copied()
            .filter(|&pos| pos != up_stairs)
    } else {
        None
    };

    grid.set(up_stairs, Cell::Object(Feature::new(FeatureKind::UpStairs)));
    if let Some(pos) = down_stairs {
        grid.set(pos, Cell::Object(Feature::new(FeatureKind::DownStairs)));
    }

    for _ in 0..plan.blockers {
        let dead_ends = open_dead_ends(grid);
        if dead_ends.is_empty() {
            break;
        }
        let pos = dead_ends[random_index(rng, dead_ends.len())];
        let kind = BLOCKER_KINDS[random_index(rng, BLOCKER_KINDS.len())];
        grid.set(pos, Cell::Object(Feature::new(kind)));
    }

    let mut free: Vec<Pos> =
        grid.positions().filter(|&pos| grid.cell_at(pos) == Cell::Empty).collect();
    for _ in 0..plan.features {
        if free.is_empty() {
            break;
        }
        let pos = free.swap_remove(random_index(rng, free.len()));
        let kind = SCATTERED_KINDS[random_index(rng, SCATTERED_KINDS.len())];
        grid.set(pos, Cell::Object(Feature::new(kind)));
    }

    Some(Population { up_stairs, down_stairs })
}

/// Lowest Manhattan distance wins; ties go to the lowest `y`, then `x`.
fn nearest_open_cell(grid: &Grid, desired: Pos) -> Option<Pos> {
    grid.positions()
        .filter(|&pos| grid.cell_at(pos) == Cell::Empty)
        .min_by_key(|&pos| (pos.manhattan(desired), pos.y, pos.x))
}

/// Empty cells with exactly one passable neighbour. Blocking one never splits the rest.
fn open_dead_ends(grid: &Grid) -> Vec<Pos> {
    grid.positions()
        .filter(|&pos| grid.cell_at(pos) == Cell::Empty)
        .filter(|&pos| grid.count_cardinal_neighbors(pos, Cell::is_passable_terrain) == 1)
        .collect()
}
