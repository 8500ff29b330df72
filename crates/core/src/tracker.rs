//! Placement and displacement: the only code that writes occupants into a live grid.
//! Every operation either fully applies or leaves the level untouched.

use crate::cell::Cell;
use crate::error::{Blocker, DungeonError, UsageError};
use crate::level::{Level, Placement};
use crate::types::{Direction, Occupant, OccupantId, Pos};

/// A redrawn coordinate and what it holds now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellChange {
    pub pos: Pos,
    pub cell: Cell,
}

impl Level {
    /// Places `occupant` at `pos`, saving whatever was there. Walls and other occupants refuse.
    pub fn spawn(&mut self, pos: Pos, occupant: Occupant) -> Result<CellChange, DungeonError> {
        if self.placements.contains_key(occupant.id) {
            return Err(UsageError::AlreadyPlaced(occupant.id).into());
        }
        let Some(&cell) = self.grid.get(pos) else {
            return Err(DungeonError::OutOfBounds { pos });
        };
        match cell {
            Cell::Wall => return Err(DungeonError::Blocked { pos, blocker: Blocker::Wall }),
            Cell::Occupant(other) => {
                return Err(DungeonError::Blocked { pos, blocker: Blocker::Occupant(other.id) });
            }
            Cell::Empty | Cell::Object(_) => {}
        }

        self.placements.insert(occupant.id, Placement::cover(occupant, pos, cell));
        self.grid.set(pos, Cell::Occupant(occupant));
        Ok(CellChange { pos, cell: Cell::Occupant(occupant) })
    }

    /// Steps a placed occupant one cell. On success the old cell shows its restored content
    /// and the new one shows the occupant; both are returned in that order.
    pub fn move_occupant(
        &mut self,
        id: OccupantId,
        direction: Direction,
    ) -> Result<Vec<CellChange>, DungeonError> {
        let Some(&placement) = self.placements.get(id) else {
            return Err(UsageError::NotPlaced(id).into());
        };
        if direction == Direction::None {
            return Ok(Vec::new());
        }

        let target = placement.pos.step(direction);
        let Some(&cell) = self.grid.get(target) else {
            return Err(DungeonError::OutOfBounds { pos: target });
        };
        if let Some(blocker) = blocker_of(cell) {
            return Err(DungeonError::Blocked { pos: target, blocker });
        }

        let restored = placement.uncovered();
        self.grid.set(placement.pos, restored);
        self.placements.insert(id, Placement::cover(placement.occupant, target, cell));
        self.grid.set(target, Cell::Occupant(placement.occupant));

        Ok(vec![
            CellChange { pos: placement.pos, cell: restored },
            CellChange { pos: target, cell: Cell::Occupant(placement.occupant) },
        ])
    }

    /// Takes an occupant off the grid, restoring what it covered.
    pub fn remove(&mut self, id: OccupantId) -> Result<CellChange, DungeonError> {
        let Some(placement) = self.placements.remove(id) else {
            return Err(UsageError::NotPlaced(id).into());
        };
        let restored = placement.uncovered();
        self.grid.set(placement.pos, restored);
        Ok(CellChange { pos: placement.pos, cell: restored })
    }
}

fn blocker_of(cell: Cell) -> Option<Blocker> {
    match cell {
        Cell::Wall => Some(Blocker::Wall),
        Cell::Occupant(other) => Some(Blocker::Occupant(other.id)),
        Cell::Object(feature) if !feature.displaceable => Some(Blocker::Object),
        Cell::Empty | Cell::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;
    use crate::cell::{Feature, FeatureKind};
    use crate::grid::Grid;
    use crate::mapgen::GeneratedLevel;
    use crate::types::{LevelId, MonsterKind, OccupantKind};

    struct Fixture {
        level: Level,
        ids: SlotMap<OccupantId, ()>,
    }

    impl Fixture {
        fn occupant(&mut self, kind: OccupantKind) -> Occupant {
            Occupant { id: self.ids.insert(()), kind }
        }
    }

    /// ```text
    /// #######
    /// #.$.&.#
    /// #.....#
    /// #######
    /// ```
    fn room_fixture() -> Fixture {
        let mut grid = Grid::filled(7, 4, Cell::Wall);
        for y in 1..3 {
            for x in 1..6 {
                grid.set(Pos { y, x }, Cell::Empty);
            }
        }
        grid.set(Pos { y: 1, x: 2 }, Cell::Object(Feature::new(FeatureKind::Gold)));
        grid.set(Pos { y: 1, x: 4 }, Cell::Object(Feature::new(FeatureKind::Statue)));
        let level = Level::new(
            LevelId::dungeon(1),
            GeneratedLevel { grid, entry: Pos { y: 1, x: 1 }, down_stairs: None },
        );
        Fixture { level, ids: SlotMap::with_key() }
    }

    #[test]
    fn spawn_saves_the_covered_cell_and_writes_the_occupant() {
        let mut fixture = room_fixture();
        let player = fixture.occupant(OccupantKind::Player);
        let pos = Pos { y: 1, x: 1 };

        let change = fixture.level.spawn(pos, player).expect("spawn on floor");

        assert_eq!(change, CellChange { pos, cell: Cell::Occupant(player) });
        assert_eq!(fixture.level.cell_at(pos), Cell::Occupant(player));
        assert_eq!(fixture.level.covered_by(player.id), Some(Cell::Empty));
        assert_eq!(fixture.level.audit(), Ok(()));
    }

    #[test]
    fn spawn_onto_wall_is_blocked_and_leaves_the_grid_unchanged() {
        let mut fixture = room_fixture();
        let player = fixture.occupant(OccupantKind::Player);
        let before = fixture.level.canonical_bytes();

        let result = fixture.level.spawn(Pos { y: 0, x: 3 }, player);

        assert_eq!(
            result,
            Err(DungeonError::Blocked { pos: Pos { y: 0, x: 3 }, blocker: Blocker::Wall })
        );
        assert_eq!(fixture.level.canonical_bytes(), before);
        assert_eq!(fixture.level.position_of(player.id), None);
    }

    #[test]
    fn spawn_rejects_out_of_bounds_occupied_cells_and_double_placement() {
        let mut fixture = room_fixture();
        let player = fixture.occupant(OccupantKind::Player);
        let rat = fixture.occupant(OccupantKind::Monster(MonsterKind::Rat));
        let pos = Pos { y: 2, x: 2 };

        assert_eq!(
            fixture.level.spawn(Pos { y: 9, x: 1 }, player),
            Err(DungeonError::OutOfBounds { pos: Pos { y: 9, x: 1 } })
        );
        fixture.level.spawn(pos, player).expect("spawn");
        assert_eq!(
            fixture.level.spawn(pos, rat),
            Err(DungeonError::Blocked { pos, blocker: Blocker::Occupant(player.id) })
        );
        assert_eq!(
            fixture.level.spawn(Pos { y: 2, x: 3 }, player),
            Err(DungeonError::InvalidUsage(UsageError::AlreadyPlaced(player.id)))
        );
    }

    #[test]
    fn moving_over_gold_hides_it_then_restores_it_exactly() {
        let mut fixture = room_fixture();
        let player = fixture.occupant(OccupantKind::Player);
        let gold = fixture.level.cell_at(Pos { y: 1, x: 2 });
        fixture.level.spawn(Pos { y: 1, x: 1 }, player).expect("spawn");

        let changes = fixture.level.move_occupant(player.id, Direction::East).expect("move");
        assert_eq!(
            changes,
            vec![
                CellChange { pos: Pos { y: 1, x: 1 }, cell: Cell::Empty },
                CellChange { pos: Pos { y: 1, x: 2 }, cell: Cell::Occupant(player) },
            ]
        );
        assert!(matches!(
            fixture.level.covered_by(player.id),
            Some(Cell::Object(feature)) if feature.kind == FeatureKind::Gold && feature.visible
        ));
        assert!(matches!(
            fixture.level.occupants().next().map(Placement::covered),
            Some(Cell::Object(feature)) if !feature.visible
        ));

        fixture.level.move_occupant(player.id, Direction::SouthEast).expect("move");
        assert_eq!(fixture.level.cell_at(Pos { y: 1, x: 2 }), gold);
        assert_eq!(fixture.level.audit(), Ok(()));
    }

    #[test]
    fn move_round_trip_restores_both_cells() {
        let mut fixture = room_fixture();
        let player = fixture.occupant(OccupantKind::Player);
        let start = Pos { y: 2, x: 3 };
        fixture.level.spawn(start, player).expect("spawn");
        let before = fixture.level.canonical_bytes();
        let record = fixture.level.covered_by(player.id);

        for direction in [Direction::NorthWest, Direction::West, Direction::East] {
            fixture.level.move_occupant(player.id, direction).expect("out");
            fixture.level.move_occupant(player.id, direction.opposite()).expect("back");
            assert_eq!(fixture.level.position_of(player.id), Some(start));
            assert_eq!(fixture.level.covered_by(player.id), record);
            assert_eq!(fixture.level.canonical_bytes(), before, "{direction:?}");
        }
    }

    #[test]
    fn blocked_moves_change_nothing() {
        let mut fixture = room_fixture();
        let player = fixture.occupant(OccupantKind::Player);
        let troll = fixture.occupant(OccupantKind::Monster(MonsterKind::Troll));
        fixture.level.spawn(Pos { y: 1, x: 5 }, player).expect("spawn");
        fixture.level.spawn(Pos { y: 2, x: 5 }, troll).expect("spawn");
        let before = fixture.level.canonical_bytes();

        let cases = [
            (Direction::East, Blocker::Wall),
            (Direction::West, Blocker::Object),
            (Direction::South, Blocker::Occupant(troll.id)),
        ];
        for (direction, blocker) in cases {
            let target = Pos { y: 1, x: 5 }.step(direction);
            assert_eq!(
                fixture.level.move_occupant(player.id, direction),
                Err(DungeonError::Blocked { pos: target, blocker })
            );
        }
        assert_eq!(fixture.level.canonical_bytes(), before);
        assert_eq!(fixture.level.audit(), Ok(()));
    }

    #[test]
    fn moves_off_the_grid_are_out_of_bounds() {
        let grid = Grid::filled(3, 3, Cell::Empty);
        let mut level = Level::new(
            LevelId::HOME,
            GeneratedLevel { grid, entry: Pos { y: 0, x: 0 }, down_stairs: None },
        );
        let mut ids = SlotMap::<OccupantId, ()>::with_key();
        let player = Occupant { id: ids.insert(()), kind: OccupantKind::Player };
        level.spawn(Pos { y: 0, x: 0 }, player).expect("spawn");

        assert_eq!(
            level.move_occupant(player.id, Direction::NorthWest),
            Err(DungeonError::OutOfBounds { pos: Pos { y: -1, x: -1 } })
        );
        assert_eq!(level.position_of(player.id), Some(Pos { y: 0, x: 0 }));
    }

    #[test]
    fn standing_still_is_a_no_op() {
        let mut fixture = room_fixture();
        let player = fixture.occupant(OccupantKind::Player);
        fixture.level.spawn(Pos { y: 1, x: 1 }, player).expect("spawn");
        let before = fixture.level.canonical_bytes();

        assert_eq!(fixture.level.move_occupant(player.id, Direction::None), Ok(Vec::new()));
        assert_eq!(fixture.level.canonical_bytes(), before);
    }

    #[test]
    fn unplaced_occupants_cannot_move_or_be_removed() {
        let mut fixture = room_fixture();
        let bat = fixture.occupant(OccupantKind::Monster(MonsterKind::Bat));
        let not_placed = DungeonError::InvalidUsage(UsageError::NotPlaced(bat.id));

        assert_eq!(fixture.level.move_occupant(bat.id, Direction::North), Err(not_placed));
        assert_eq!(fixture.level.remove(bat.id), Err(not_placed));
    }

    #[test]
    fn remove_restores_covered_content_and_forgets_the_record() {
        let mut fixture = room_fixture();
        let goblin = fixture.occupant(OccupantKind::Monster(MonsterKind::Goblin));
        let gold_pos = Pos { y: 1, x: 2 };
        let gold = fixture.level.cell_at(gold_pos);
        fixture.level.spawn(gold_pos, goblin).expect("spawn onto gold");

        let change = fixture.level.remove(goblin.id).expect("remove");

        assert_eq!(change, CellChange { pos: gold_pos, cell: gold });
        assert_eq!(fixture.level.cell_at(gold_pos), gold);
        assert_eq!(fixture.level.position_of(goblin.id), None);
        assert_eq!(
            fixture.level.remove(goblin.id),
            Err(DungeonError::InvalidUsage(UsageError::NotPlaced(goblin.id)))
        );
    }
}
