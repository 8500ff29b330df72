//! Randomized Prim's growth carving one tree-shaped open region inside a walled border.

use rand_chacha::rand_core::Rng;

use crate::cell::Cell;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::types::Pos;

use super::seed::random_index;

/// A frontier candidate is carved only while it touches at most this many open cells.
const MAX_OPEN_NEIGHBORS_TO_CARVE: usize = 1;

pub fn carve_maze<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<Grid, GenerationError> {
    if width < 3 || height < 3 {
        return Err(GenerationError::NoInterior { width, height });
    }

    let mut grid = Grid::filled(width, height, Cell::Wall);
    let mut queued = vec![false; width * height];
    let seed = Pos {
        y: 1 + random_index(rng, height - 2) as i32,
        x: 1 + random_index(rng, width - 2) as i32,
    };
    let mut frontier = vec![seed];
    queued[queue_index(width, seed)] = true;

    while !frontier.is_empty() {
        let candidate = frontier.swap_remove(random_index(rng, frontier.len()));
        let open_neighbors = grid.count_cardinal_neighbors(candidate, |cell| *cell == Cell::Empty);
        if open_neighbors > MAX_OPEN_NEIGHBORS_TO_CARVE {
            continue;
        }

        grid.set(candidate, Cell::Empty);
        for next in candidate.cardinal_neighbors() {
            if grid.is_border(next) || grid.cell_at(next) != Cell::Wall {
                continue;
            }
            let idx = queue_index(width, next);
            if queued[idx] {
                continue;
            }
            queued[idx] = true;
            frontier.push(next);
        }
    }

    Ok(grid)
}

/// The home level: no walls anywhere.
pub fn open_grid(width: usize, height: usize) -> Grid {
    Grid::filled(width, height, Cell::Empty)
}

fn queue_index(width: usize, pos: Pos) -> usize {
    (pos.y as usize) * width + (pos.x as usize)
}
