//! Closed set of grid contents and the capabilities an external renderer reads from them.

use crate::types::{Color, Glyph, MonsterKind, Occupant, OccupantKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureKind {
    Chest,
    Fountain,
    Trap,
    Altar,
    Gold,
    Statue,
    Throne,
    UpStairs,
    DownStairs,
}

impl FeatureKind {
    /// Statues and thrones block movement while still being drawn as features.
    pub fn blocks_movement(self) -> bool {
        matches!(self, FeatureKind::Statue | FeatureKind::Throne)
    }

    /// Traps are placed undiscovered.
    pub fn starts_hidden(self) -> bool {
        self == FeatureKind::Trap
    }
}

/// An item or dungeon feature lying on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Feature {
    pub kind: FeatureKind,
    pub displaceable: bool,
    pub visible: bool,
}

impl Feature {
    pub fn new(kind: FeatureKind) -> Self {
        Self { kind, displaceable: !kind.blocks_movement(), visible: !kind.starts_hidden() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Empty,
    Object(Feature),
    Occupant(Occupant),
}

impl Cell {
    pub fn is_wall(&self) -> bool {
        matches!(self, Cell::Wall)
    }

    /// Whether an occupant may step onto this cell, covering it.
    pub fn is_displaceable(&self) -> bool {
        match self {
            Cell::Wall | Cell::Occupant(_) => false,
            Cell::Empty => true,
            Cell::Object(feature) => feature.displaceable,
        }
    }

    /// Passable terrain ignoring who currently stands on it.
    pub fn is_passable_terrain(&self) -> bool {
        match self {
            Cell::Wall => false,
            Cell::Empty | Cell::Occupant(_) => true,
            Cell::Object(feature) => feature.displaceable,
        }
    }
}

pub trait Renderable {
    fn glyph(&self) -> Glyph;
}

impl Renderable for FeatureKind {
    fn glyph(&self) -> Glyph {
        match self {
            FeatureKind::Chest => Glyph::new('=', Color::Yellow, Color::Black),
            FeatureKind::Fountain => Glyph::new('{', Color::Cyan, Color::Black),
            FeatureKind::Trap => Glyph::new('^', Color::Red, Color::Black),
            FeatureKind::Altar => Glyph::new('_', Color::White, Color::Black),
            FeatureKind::Gold => Glyph::new('$', Color::Yellow, Color::Black),
            FeatureKind::Statue => Glyph::new('&', Color::Gray, Color::Black),
            FeatureKind::Throne => Glyph::new('\\', Color::Magenta, Color::Black),
            FeatureKind::UpStairs => Glyph::new('<', Color::White, Color::Black),
            FeatureKind::DownStairs => Glyph::new('>', Color::White, Color::Black),
        }
    }
}

impl Renderable for Feature {
    fn glyph(&self) -> Glyph {
        if self.visible { self.kind.glyph() } else { EMPTY_GLYPH }
    }
}

impl Renderable for OccupantKind {
    fn glyph(&self) -> Glyph {
        match self {
            OccupantKind::Player => Glyph::new('@', Color::White, Color::Black),
            OccupantKind::Monster(monster) => match monster {
                MonsterKind::Rat => Glyph::new('r', Color::Gray, Color::Black),
                MonsterKind::Bat => Glyph::new('b', Color::Magenta, Color::Black),
                MonsterKind::Goblin => Glyph::new('g', Color::Green, Color::Black),
                MonsterKind::Snake => Glyph::new('S', Color::Green, Color::Black),
                MonsterKind::Troll => Glyph::new('T', Color::Blue, Color::Black),
                MonsterKind::FireImp => Glyph::new('i', Color::Red, Color::Black),
                MonsterKind::Dragon => Glyph::new('D', Color::Red, Color::Black),
            },
        }
    }
}

const WALL_GLYPH: Glyph = Glyph::new('#', Color::Gray, Color::Gray);
const EMPTY_GLYPH: Glyph = Glyph::new('.', Color::Gray, Color::Black);

impl Renderable for Cell {
    fn glyph(&self) -> Glyph {
        match self {
            Cell::Wall => WALL_GLYPH,
            Cell::Empty => EMPTY_GLYPH,
            Cell::Object(feature) => feature.glyph(),
            Cell::Occupant(occupant) => occupant.kind.glyph(),
        }
    }
}
