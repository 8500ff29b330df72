//! One live level: its identity, grid, and the displacement records of everyone on it.

use slotmap::SecondaryMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::cell::{Cell, FeatureKind, Renderable};
use crate::grid::Grid;
use crate::mapgen::GeneratedLevel;
use crate::types::{LevelId, MonsterKind, Occupant, OccupantId, OccupantKind, Pos};

/// Saved content underneath a placed occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub(crate) occupant: Occupant,
    pub(crate) pos: Pos,
    /// Never `Wall` or `Occupant`. Objects are stored hidden while covered.
    pub(crate) covered: Cell,
    pub(crate) covered_was_visible: bool,
}

impl Placement {
    pub(crate) fn cover(occupant: Occupant, pos: Pos, cell: Cell) -> Self {
        match cell {
            Cell::Object(mut feature) => {
                let covered_was_visible = feature.visible;
                feature.visible = false;
                Self { occupant, pos, covered: Cell::Object(feature), covered_was_visible }
            }
            other => Self { occupant, pos, covered: other, covered_was_visible: false },
        }
    }

    /// The content to write back when the occupant leaves.
    pub(crate) fn uncovered(&self) -> Cell {
        match self.covered {
            Cell::Object(mut feature) => {
                feature.visible = self.covered_was_visible;
                Cell::Object(feature)
            }
            other => other,
        }
    }

    pub fn occupant(&self) -> Occupant {
        self.occupant
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// The covered content in its hidden form, as stored while the occupant stands on it.
    pub fn covered(&self) -> Cell {
        self.covered
    }
}

#[derive(Clone, Debug)]
pub struct Level {
    id: LevelId,
    pub(crate) grid: Grid,
    entry: Pos,
    down_stairs: Option<Pos>,
    pub(crate) placements: SecondaryMap<OccupantId, Placement>,
}

impl Level {
    pub fn new(id: LevelId, generated: GeneratedLevel) -> Self {
        Self {
            id,
            grid: generated.grid,
            entry: generated.entry,
            down_stairs: generated.down_stairs,
            placements: SecondaryMap::new(),
        }
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn cell_at(&self, pos: Pos) -> Cell {
        self.grid.cell_at(pos)
    }

    pub fn entry(&self) -> Pos {
        self.entry
    }

    pub fn down_stairs(&self) -> Option<Pos> {
        self.down_stairs
    }

    pub fn position_of(&self, id: OccupantId) -> Option<Pos> {
        self.placements.get(id).map(|placement| placement.pos)
    }

    /// What a placed occupant is standing on, exactly as it was before being covered.
    pub fn covered_by(&self, id: OccupantId) -> Option<Cell> {
        self.placements.get(id).map(Placement::uncovered)
    }

    pub fn occupants(&self) -> impl Iterator<Item = &Placement> {
        self.placements.values()
    }

    pub fn occupant_count(&self) -> usize {
        self.placements.len()
    }

    /// Checks that every record matches the grid and that no occupant cell lacks a record.
    pub fn audit(&self) -> Result<(), String> {
        for (id, placement) in &self.placements {
            if placement.occupant.id != id {
                return Err(format!("record for {id:?} names {:?}", placement.occupant.id));
            }
            match self.grid.get(placement.pos) {
                Some(Cell::Occupant(occupant)) if *occupant == placement.occupant => {}
                other => {
                    return Err(format!(
                        "{id:?} recorded at {:?} but the cell holds {other:?}",
                        placement.pos
                    ));
                }
            }
            if matches!(placement.covered, Cell::Wall | Cell::Occupant(_)) {
                return Err(format!("{id:?} covers {:?}", placement.covered));
            }
        }
        for pos in self.grid.positions() {
            if let Cell::Occupant(occupant) = self.grid.cell_at(pos)
                && self.placements.get(occupant.id).is_none_or(|placement| placement.pos != pos)
            {
                return Err(format!("{:?} at {pos:?} has no matching record", occupant.id));
            }
        }
        Ok(())
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.grid.cells().len() * 2);
        bytes.extend((self.width() as u32).to_le_bytes());
        bytes.extend((self.height() as u32).to_le_bytes());
        for cell in self.grid.cells() {
            match cell {
                Cell::Wall => bytes.push(0),
                Cell::Empty => bytes.push(1),
                Cell::Object(feature) => {
                    bytes.push(2);
                    bytes.push(feature_code(feature.kind));
                    bytes.push(u8::from(feature.displaceable) | (u8::from(feature.visible) << 1));
                }
                Cell::Occupant(occupant) => {
                    bytes.push(3);
                    bytes.push(occupant_code(occupant.kind));
                }
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    /// One line per row of glyph symbols, as a terminal renderer would draw them.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pos = Pos { y: y as i32, x: x as i32 };
                out.push(self.cell_at(pos).glyph().symbol);
            }
            out.push('\n');
        }
        out
    }
}

fn feature_code(kind: FeatureKind) -> u8 {
    match kind {
        FeatureKind::Chest => 0,
        FeatureKind::Fountain => 1,
        FeatureKind::Trap => 2,
        FeatureKind::Altar => 3,
        FeatureKind::Gold => 4,
        FeatureKind::Statue => 5,
        FeatureKind::Throne => 6,
        FeatureKind::UpStairs => 7,
        FeatureKind::DownStairs => 8,
    }
}

fn occupant_code(kind: OccupantKind) -> u8 {
    match kind {
        OccupantKind::Player => 0,
        OccupantKind::Monster(MonsterKind::Rat) => 1,
        OccupantKind::Monster(MonsterKind::Bat) => 2,
        OccupantKind::Monster(MonsterKind::Goblin) => 3,
        OccupantKind::Monster(MonsterKind::Snake) => 4,
        OccupantKind::Monster(MonsterKind::Troll) => 5,
        OccupantKind::Monster(MonsterKind::FireImp) => 6,
        OccupantKind::Monster(MonsterKind::Dragon) => 7,
    }
}
