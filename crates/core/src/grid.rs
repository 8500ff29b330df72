//! Flat fixed-size cell container shared by generation and placement.

use std::collections::VecDeque;

use crate::cell::Cell;
use crate::types::Pos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self { width, height, cells: vec![cell; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn is_border(&self, pos: Pos) -> bool {
        pos.x == 0
            || pos.y == 0
            || i64::from(pos.x) + 1 == self.width as i64
            || i64::from(pos.y) + 1 == self.height as i64
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells.get(self.index(pos))
    }

    /// Out-of-bounds reads see solid rock.
    pub fn cell_at(&self, pos: Pos) -> Cell {
        self.get(pos).copied().unwrap_or(Cell::Wall)
    }

    pub(crate) fn set(&mut self, pos: Pos, cell: Cell) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row-major iteration over every coordinate.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos { y: y as i32, x: x as i32 }))
    }

    pub fn count(&self, predicate: impl Fn(&Cell) -> bool) -> usize {
        self.cells.iter().filter(|cell| predicate(*cell)).count()
    }

    pub fn count_cardinal_neighbors(&self, pos: Pos, predicate: impl Fn(&Cell) -> bool) -> usize {
        pos.cardinal_neighbors()
            .into_iter()
            .filter(|&next| self.get(next).is_some_and(&predicate))
            .count()
    }

    /// Cells matching `predicate` reached from `start` by 4-directional steps, in BFS order.
    pub fn flood_fill(&self, start: Pos, predicate: impl Fn(&Cell) -> bool) -> Vec<Pos> {
        if !self.get(start).is_some_and(&predicate) {
            return Vec::new();
        }
        let mut seen = vec![false; self.cells.len()];
        seen[self.index(start)] = true;
        let mut open = VecDeque::from([start]);
        let mut order = Vec::new();
        while let Some(pos) = open.pop_front() {
            order.push(pos);
            for next in pos.cardinal_neighbors() {
                if !self.get(next).is_some_and(&predicate) {
                    continue;
                }
                let idx = self.index(next);
                if seen[idx] {
                    continue;
                }
                seen[idx] = true;
                open.push_back(next);
            }
        }
        order
    }

    /// True when every cell matching `predicate` lies in one 4-connected region.
    pub fn is_connected(&self, predicate: impl Fn(&Cell) -> bool) -> bool {
        let total = self.count(&predicate);
        let Some(start) = self.positions().find(|&pos| self.get(pos).is_some_and(&predicate))
        else {
            return true;
        };
        self.flood_fill(start, predicate).len() == total
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}
